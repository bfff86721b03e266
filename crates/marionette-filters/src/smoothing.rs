//! Exponential smoothing of tracked bone poses.
//!
//! Each bone keeps its last smoothed pose.  On every frame the new sample is
//! blended toward that history:
//!
//! ```text
//! position = previous.position + α * (sample.position − previous.position)
//! rotation = nlerp(previous.rotation, sample.rotation, α)
//! ```
//!
//! where α ∈ [0, 1].  `α = 1` passes samples through unchanged; smaller
//! values trade latency for less jitter.  The first sample of a bone has no
//! history and passes through.
//!
//! # Example
//!
//! ```rust
//! use marionette_filters::smoothing::SmoothingFilter;
//! use marionette_pipeline::skeleton::SkeletonProcessor;
//! use marionette_types::{BoneId, BoneSample, TrackedSkeleton, TransformRef, Vec3};
//!
//! let filter = SmoothingFilter::new("smooth", 0.5);
//! let hips = TransformRef::at(Vec3::zero());
//! let mut skeleton = TrackedSkeleton::new(vec![BoneSample::tracked(BoneId::Hips, hips.clone())]);
//! filter.process_skeleton(&mut skeleton);
//!
//! hips.set_position(Vec3::new(2.0, 0.0, 0.0));
//! filter.process_skeleton(&mut skeleton);
//! assert_eq!(hips.position(), Vec3::new(1.0, 0.0, 0.0));
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use marionette_pipeline::SkeletonProcessor;
use marionette_types::{BoneId, Pose, TrackedSkeleton};
use tracing::trace;

// ────────────────────────────────────────────────────────────────────────────
// SmoothingFilter
// ────────────────────────────────────────────────────────────────────────────

/// Skeleton processor that low-pass filters every tracked bone.
#[derive(Debug)]
pub struct SmoothingFilter {
    label: String,
    /// Blend factor toward the newest sample, clamped to `[0, 1]`.
    alpha: f32,
    history: Mutex<HashMap<BoneId, Pose>>,
}

impl SmoothingFilter {
    /// Create a filter.  `alpha` is clamped to `[0, 1]`; NaN disables
    /// smoothing (alpha 1).
    pub fn new(label: impl Into<String>, alpha: f32) -> Self {
        Self {
            label: label.into(),
            alpha: if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) },
            history: Mutex::new(HashMap::new()),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Forget all history; the next sample of every bone passes through.
    pub fn reset(&self) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SkeletonProcessor for SmoothingFilter {
    fn label(&self) -> &str {
        &self.label
    }

    fn process_skeleton(&self, skeleton: &mut TrackedSkeleton) {
        if !skeleton.data_valid {
            trace!(processor = %self.label, "skeleton not tracked; smoothing skipped");
            return;
        }
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        for sample in skeleton.bones() {
            let Some(transform) = &sample.transform else {
                continue;
            };
            let current = transform.pose();
            let smoothed = match history.get(&sample.id) {
                Some(previous) => {
                    let position = previous.position.lerp(current.position, self.alpha);
                    let rotation = previous.rotation.nlerp(current.rotation, self.alpha);
                    transform.set_position_and_rotation(position, rotation);
                    Pose {
                        position,
                        rotation,
                        scale: current.scale,
                    }
                }
                None => current,
            };
            history.insert(sample.id, smoothed);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use marionette_types::{BoneSample, Quaternion, TransformRef, Vec3};

    fn skeleton_of(hips: &TransformRef) -> TrackedSkeleton {
        TrackedSkeleton::new(vec![BoneSample::tracked(BoneId::Hips, hips.clone())])
    }

    #[test]
    fn first_sample_passes_through() {
        let filter = SmoothingFilter::new("smooth", 0.1);
        let hips = TransformRef::at(Vec3::new(3.0, 1.0, 0.0));
        filter.process_skeleton(&mut skeleton_of(&hips));
        assert_eq!(hips.position(), Vec3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn position_moves_alpha_of_the_way() {
        let filter = SmoothingFilter::new("smooth", 0.25);
        let hips = TransformRef::at(Vec3::zero());
        let mut skeleton = skeleton_of(&hips);
        filter.process_skeleton(&mut skeleton);

        hips.set_position(Vec3::new(4.0, 0.0, 0.0));
        filter.process_skeleton(&mut skeleton);
        assert!((hips.position().x - 1.0).abs() < 1e-5);

        // The smoothed value is the new history: 1 + 0.25 * (4 - 1) = 1.75.
        hips.set_position(Vec3::new(4.0, 0.0, 0.0));
        filter.process_skeleton(&mut skeleton);
        assert!((hips.position().x - 1.75).abs() < 1e-5);
    }

    #[test]
    fn alpha_one_is_passthrough() {
        let filter = SmoothingFilter::new("smooth", 1.0);
        let hips = TransformRef::at(Vec3::zero());
        let mut skeleton = skeleton_of(&hips);
        filter.process_skeleton(&mut skeleton);

        hips.set_position_and_rotation(Vec3::new(0.0, 2.0, 0.0), Quaternion::from_yaw(1.0));
        filter.process_skeleton(&mut skeleton);
        assert_eq!(hips.position(), Vec3::new(0.0, 2.0, 0.0));
        assert!(hips.rotation().approx_eq(Quaternion::from_yaw(1.0), 1e-5));
    }

    #[test]
    fn rotation_is_blended() {
        let filter = SmoothingFilter::new("smooth", 0.5);
        let hips = TransformRef::default();
        let mut skeleton = skeleton_of(&hips);
        filter.process_skeleton(&mut skeleton);

        hips.set_position_and_rotation(Vec3::zero(), Quaternion::from_yaw(1.0));
        filter.process_skeleton(&mut skeleton);
        assert!(hips.rotation().approx_eq(Quaternion::from_yaw(0.5), 1e-4));
    }

    #[test]
    fn nan_alpha_passes_samples_through() {
        let filter = SmoothingFilter::new("smooth", f32::NAN);
        assert_eq!(filter.alpha(), 1.0);

        let hips = TransformRef::at(Vec3::zero());
        let mut skeleton = skeleton_of(&hips);
        filter.process_skeleton(&mut skeleton);
        hips.set_position(Vec3::new(2.0, 0.0, 0.0));
        filter.process_skeleton(&mut skeleton);
        assert_eq!(hips.position(), Vec3::new(2.0, 0.0, 0.0));
        assert!(!hips.rotation().w.is_nan());
    }

    #[test]
    fn infinite_alpha_clamps_to_bounds() {
        assert_eq!(SmoothingFilter::new("hi", f32::INFINITY).alpha(), 1.0);
        assert_eq!(SmoothingFilter::new("lo", f32::NEG_INFINITY).alpha(), 0.0);
    }

    #[test]
    fn alpha_clamped_to_unit_interval() {
        assert_eq!(SmoothingFilter::new("hi", 3.0).alpha(), 1.0);
        assert_eq!(SmoothingFilter::new("lo", -2.0).alpha(), 0.0);
    }

    #[test]
    fn stale_samples_and_invalid_frames_are_skipped() {
        let filter = SmoothingFilter::new("smooth", 0.5);
        let hips = TransformRef::at(Vec3::zero());
        filter.process_skeleton(&mut skeleton_of(&hips));

        let mut stale = TrackedSkeleton::new(vec![BoneSample::stale(BoneId::Hips)]);
        filter.process_skeleton(&mut stale);

        let mut invalid = skeleton_of(&hips);
        invalid.data_valid = false;
        hips.set_position(Vec3::new(8.0, 0.0, 0.0));
        filter.process_skeleton(&mut invalid);
        assert_eq!(hips.position(), Vec3::new(8.0, 0.0, 0.0));

        // History still holds the origin from the first frame.
        filter.process_skeleton(&mut skeleton_of(&hips));
        assert_eq!(hips.position(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn reset_drops_history() {
        let filter = SmoothingFilter::new("smooth", 0.5);
        let hips = TransformRef::at(Vec3::zero());
        filter.process_skeleton(&mut skeleton_of(&hips));

        filter.reset();
        hips.set_position(Vec3::new(6.0, 0.0, 0.0));
        filter.process_skeleton(&mut skeleton_of(&hips));
        assert_eq!(hips.position(), Vec3::new(6.0, 0.0, 0.0));
    }
}
