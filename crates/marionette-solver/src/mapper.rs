//! [`BoneTargetMapper`] – copies tracked bones onto arbitrary transforms.
//!
//! Targets are declared with the humanoid vocabulary
//! ([`HumanBodyBone`]) and resolved once, at configuration time, to the
//! tracked [`BoneId`].  Every frame [`BoneTargetMapper::update`] walks the
//! bone samples and, for each target bound to a sample's bone, copies the
//! sample's world position and rotation onto the target.
//!
//! Several targets may follow the same bone.  Samples without a live
//! transform are skipped for that frame.

use marionette_types::{BoneId, BoneSample, HumanBodyBone, RigError, TransformRef};
use tracing::{debug, trace};

/// A user-declared `humanoid bone → output transform` binding.
#[derive(Debug, Clone)]
pub struct BoneTargetDeclaration {
    pub human_body_bone: HumanBodyBone,
    pub output: TransformRef,
}

impl BoneTargetDeclaration {
    pub fn new(human_body_bone: HumanBodyBone, output: TransformRef) -> Self {
        Self {
            human_body_bone,
            output,
        }
    }
}

/// A declaration whose bone has been resolved to a [`BoneId`].
#[derive(Debug, Clone)]
pub struct RetargetedBoneTarget {
    human_body_bone: HumanBodyBone,
    bone_id: BoneId,
    output: TransformRef,
}

impl RetargetedBoneTarget {
    pub fn human_body_bone(&self) -> HumanBodyBone {
        self.human_body_bone
    }

    pub fn bone_id(&self) -> BoneId {
        self.bone_id
    }

    pub fn output(&self) -> &TransformRef {
        &self.output
    }
}

/// Resolved set of bone targets.
///
/// # Example
///
/// ```rust
/// use marionette_solver::mapper::{BoneTargetDeclaration, BoneTargetMapper};
/// use marionette_types::{BoneId, BoneSample, HumanBodyBone, TransformRef, Vec3};
///
/// let prop = TransformRef::default();
/// let mapper = BoneTargetMapper::configure(vec![
///     BoneTargetDeclaration::new(HumanBodyBone::RightHand, prop.clone()),
/// ])
/// .unwrap();
///
/// let wrist = TransformRef::at(Vec3::new(0.3, 1.2, 0.1));
/// mapper.update(&[BoneSample::tracked(BoneId::RightHandWrist, wrist)]);
/// assert_eq!(prop.position(), Vec3::new(0.3, 1.2, 0.1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoneTargetMapper {
    targets: Vec<RetargetedBoneTarget>,
}

impl BoneTargetMapper {
    /// Resolve every declaration through the static bone table.
    ///
    /// # Errors
    ///
    /// [`RigError::Configuration`] if any declared bone has no tracked
    /// counterpart.  No mapper is built in that case.
    pub fn configure(
        declarations: impl IntoIterator<Item = BoneTargetDeclaration>,
    ) -> Result<Self, RigError> {
        let targets = declarations
            .into_iter()
            .map(|d| {
                Ok(RetargetedBoneTarget {
                    bone_id: d.human_body_bone.resolve("bone_target_mapper")?,
                    human_body_bone: d.human_body_bone,
                    output: d.output,
                })
            })
            .collect::<Result<Vec<_>, RigError>>()?;
        debug!(targets = targets.len(), "bone target mapper configured");
        Ok(Self { targets })
    }

    pub fn targets(&self) -> &[RetargetedBoneTarget] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Copy matching samples onto their targets.
    ///
    /// Returns the number of targets written this frame.
    pub fn update(&self, samples: &[BoneSample]) -> usize {
        let mut written = 0;
        for sample in samples {
            for target in self.targets.iter().filter(|t| t.bone_id == sample.id) {
                match &sample.transform {
                    Some(transform) => {
                        let pose = transform.pose();
                        target.output.set_position_and_rotation(pose.position, pose.rotation);
                        written += 1;
                    }
                    None => trace!(bone = ?sample.id, "stale bone sample skipped"),
                }
            }
        }
        written
    }
}
