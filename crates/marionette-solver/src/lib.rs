//! `marionette-solver` – the two concrete solvers of the retargeting core.
//!
//! | Module         | What it drives                                               |
//! |----------------|--------------------------------------------------------------|
//! | [`constraint`] | target position = weighted blend of source positions        |
//! | [`mapper`]     | arbitrary transforms follow tracked bones (position + rotation) |
//! | [`processors`] | both of the above wrapped as retargeting processors          |

pub mod constraint;
pub mod mapper;
pub mod processors;

pub use constraint::{ConstraintSolver, ConstraintSource, PositionConstraint};
pub use mapper::{BoneTargetDeclaration, BoneTargetMapper, RetargetedBoneTarget};
pub use processors::{BoneTargetProcessor, PositionConstraintProcessor, TargetDirectory};
