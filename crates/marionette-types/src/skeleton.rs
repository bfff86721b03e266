//! Per-frame skeleton data handed to the core by the tracking source.

use std::sync::Arc;

use crate::bone::BoneId;
use crate::transform::TransformRef;

/// Snapshot of one tracked bone for the current frame.
///
/// `transform` is `None` when tracking for this bone is transiently stale;
/// consumers skip such samples instead of failing.
#[derive(Debug, Clone)]
pub struct BoneSample {
    pub id: BoneId,
    pub transform: Option<TransformRef>,
}

impl BoneSample {
    /// A sample backed by a live transform.
    pub fn tracked(id: BoneId, transform: TransformRef) -> Self {
        Self {
            id,
            transform: Some(transform),
        }
    }

    /// A sample whose transform is currently unavailable.
    pub fn stale(id: BoneId) -> Self {
        Self {
            id,
            transform: None,
        }
    }
}

/// Shared, read-only bone list for one frame.
///
/// Job-mode processors receive a clone of this `Arc` so their deferred work
/// can outlive the call that scheduled it.  It must still be dropped before
/// the next frame; the list is never reused across frames.
pub type FrameBones = Arc<[BoneSample]>;

/// The raw tracked skeleton for one frame, before retargeting.
#[derive(Debug, Clone, Default)]
pub struct TrackedSkeleton {
    bones: Vec<BoneSample>,
    /// `false` when the tracker reports the whole body as untracked.
    pub data_valid: bool,
}

impl TrackedSkeleton {
    pub fn new(bones: Vec<BoneSample>) -> Self {
        Self {
            bones,
            data_valid: true,
        }
    }

    pub fn bones(&self) -> &[BoneSample] {
        &self.bones
    }

    pub fn bones_mut(&mut self) -> &mut [BoneSample] {
        &mut self.bones
    }

    /// First sample carrying `id`, if present.
    pub fn find(&self, id: BoneId) -> Option<&BoneSample> {
        self.bones.iter().find(|b| b.id == id)
    }

    /// Freeze this skeleton into a shareable [`FrameBones`] list.
    pub fn to_frame_bones(&self) -> FrameBones {
        self.bones.iter().cloned().collect()
    }
}
