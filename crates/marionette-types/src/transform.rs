//! [`TransformRef`] – shared handle to a host-owned transform.
//!
//! The host (rig, scene graph, prop system) owns every transform.  The core
//! only ever holds [`TransformRef`] handles, which keep the underlying pose
//! alive and guard it with a reader/writer lock so job threads and the host
//! frame loop can both touch it.

use std::sync::{Arc, PoisonError, RwLock};

use crate::math::{Pose, Quaternion, Vec3};

/// Cloneable, thread-safe reference to a live world-space [`Pose`].
///
/// Clones share the same pose; use [`TransformRef::same_as`] to compare
/// identity rather than value.
#[derive(Debug, Clone, Default)]
pub struct TransformRef {
    pose: Arc<RwLock<Pose>>,
}

impl TransformRef {
    /// Wrap `pose` in a new, independent transform.
    pub fn new(pose: Pose) -> Self {
        Self {
            pose: Arc::new(RwLock::new(pose)),
        }
    }

    /// Identity rotation at `position`.
    pub fn at(position: Vec3) -> Self {
        Self::new(Pose::at(position))
    }

    /// Snapshot of the current pose.
    pub fn pose(&self) -> Pose {
        // A writer that panicked mid-update leaves a plain-old-data pose
        // behind; it is still a valid value to read.
        *self.pose.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn position(&self) -> Vec3 {
        self.pose().position
    }

    pub fn rotation(&self) -> Quaternion {
        self.pose().rotation
    }

    /// Replace the whole pose.
    pub fn set_pose(&self, pose: Pose) {
        *self.pose.write().unwrap_or_else(PoisonError::into_inner) = pose;
    }

    /// Overwrite the position only; rotation and scale are untouched.
    pub fn set_position(&self, position: Vec3) {
        self.pose
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .position = position;
    }

    /// Overwrite position and rotation; scale is untouched.
    pub fn set_position_and_rotation(&self, position: Vec3, rotation: Quaternion) {
        let mut pose = self.pose.write().unwrap_or_else(PoisonError::into_inner);
        pose.position = position;
        pose.rotation = rotation;
    }

    /// `true` when both handles point at the same underlying transform.
    pub fn same_as(&self, other: &TransformRef) -> bool {
        Arc::ptr_eq(&self.pose, &other.pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_pose() {
        let a = TransformRef::at(Vec3::new(1.0, 0.0, 0.0));
        let b = a.clone();
        b.set_position(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(a.position(), Vec3::new(5.0, 0.0, 0.0));
        assert!(a.same_as(&b));
    }

    #[test]
    fn independent_transforms_are_not_the_same() {
        let a = TransformRef::default();
        let b = TransformRef::default();
        assert_eq!(a.pose(), b.pose());
        assert!(!a.same_as(&b));
    }

    #[test]
    fn set_position_keeps_rotation_and_scale() {
        let mut pose = Pose::new(Vec3::zero(), Quaternion::from_yaw(1.0));
        pose.scale = Vec3::new(2.0, 2.0, 2.0);
        let t = TransformRef::new(pose);

        t.set_position(Vec3::new(3.0, 4.0, 5.0));

        let after = t.pose();
        assert_eq!(after.position, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(after.rotation, pose.rotation);
        assert_eq!(after.scale, pose.scale);
    }

    #[test]
    fn set_position_and_rotation_keeps_scale() {
        let mut pose = Pose::identity();
        pose.scale = Vec3::new(0.5, 0.5, 0.5);
        let t = TransformRef::new(pose);

        let rot = Quaternion::from_yaw(0.3);
        t.set_position_and_rotation(Vec3::new(1.0, 1.0, 1.0), rot);

        let after = t.pose();
        assert_eq!(after.rotation, rot);
        assert_eq!(after.scale, Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn handle_is_shareable_across_threads() {
        let t = TransformRef::default();
        let writer = t.clone();
        std::thread::spawn(move || writer.set_position(Vec3::new(7.0, 0.0, 0.0)))
            .join()
            .unwrap();
        assert_eq!(t.position().x, 7.0);
    }
}
