//! Weighted positional constraint solver.
//!
//! A [`PositionConstraint`] is the authored definition: a target transform,
//! a global weight, an `active` flag, and an ordered list of weighted
//! sources.  [`ConstraintSolver::from_definition`] reads that definition
//! **once** and captures everything it needs; later edits to the definition
//! are not observed.
//!
//! Each [`ConstraintSolver::update`] writes
//!
//! ```text
//! target.position = w * Σ (source_i.position * weight_i)
//! ```
//!
//! Rotation and scale of the target are never touched, and the update does
//! not allocate.
//!
//! # Example
//!
//! ```rust
//! use marionette_solver::constraint::{ConstraintSolver, ConstraintSource, PositionConstraint};
//! use marionette_types::{TransformRef, Vec3};
//!
//! let target = TransformRef::default();
//! let definition = PositionConstraint {
//!     target: target.clone(),
//!     weight: 1.0,
//!     active: true,
//!     sources: vec![
//!         ConstraintSource::new(TransformRef::at(Vec3::new(0.0, 0.0, 0.0)), 0.5),
//!         ConstraintSource::new(TransformRef::at(Vec3::new(2.0, 0.0, 0.0)), 0.5),
//!     ],
//! };
//!
//! let solver = ConstraintSolver::from_definition(Some(&definition)).unwrap();
//! solver.update();
//! assert_eq!(target.position(), Vec3::new(1.0, 0.0, 0.0));
//! ```

use marionette_types::{RigError, TransformRef, Vec3};

/// One weighted source of a positional constraint.
#[derive(Debug, Clone)]
pub struct ConstraintSource {
    pub source: TransformRef,
    pub weight: f32,
}

impl ConstraintSource {
    pub fn new(source: TransformRef, weight: f32) -> Self {
        Self { source, weight }
    }
}

/// Authored positional constraint, as found in the host scene.
#[derive(Debug, Clone)]
pub struct PositionConstraint {
    pub target: TransformRef,
    /// Global weight applied to the blended position.
    pub weight: f32,
    /// Inactive constraints cannot be mirrored into a solver.
    pub active: bool,
    pub sources: Vec<ConstraintSource>,
}

/// Captured, immutable copy of a [`PositionConstraint`] that can be applied
/// every frame.
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    target: TransformRef,
    weight: f32,
    sources: Vec<ConstraintSource>,
}

impl ConstraintSolver {
    /// Capture `definition` into a new solver.
    ///
    /// # Errors
    ///
    /// [`RigError::Configuration`] when the definition is absent, or present
    /// but inactive.  No target is modified on failure.
    pub fn from_definition(definition: Option<&PositionConstraint>) -> Result<Self, RigError> {
        let definition = definition
            .ok_or_else(|| RigError::configuration("position_constraint", "no constraint definition present"))?;
        if !definition.active {
            return Err(RigError::configuration(
                "position_constraint",
                "constraint must be active to be mirrored",
            ));
        }
        Ok(Self {
            target: definition.target.clone(),
            weight: definition.weight,
            sources: definition.sources.clone(),
        })
    }

    /// Blended position for the current source poses, without writing it.
    pub fn solve(&self) -> Vec3 {
        self.sources
            .iter()
            .fold(Vec3::zero(), |acc, s| acc.add(s.source.position().scale(s.weight)))
            .scale(self.weight)
    }

    /// Write the blended position onto the target.
    pub fn update(&self) {
        self.target.set_position(self.solve());
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn target(&self) -> &TransformRef {
        &self.target
    }

    pub fn sources(&self) -> &[ConstraintSource] {
        &self.sources
    }
}
