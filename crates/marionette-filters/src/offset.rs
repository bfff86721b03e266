//! Constant world-space offset applied to every tracked bone.

use std::sync::{PoisonError, RwLock};

use marionette_pipeline::SkeletonProcessor;
use marionette_types::{TrackedSkeleton, Vec3};
use tracing::debug;

/// Shifts all live bone positions by a fixed offset, e.g. to move the
/// tracking origin onto the avatar's floor anchor.
///
/// The filter writes into the sample transforms, so the tracking source is
/// expected to refresh them every frame.
#[derive(Debug)]
pub struct RootOffsetFilter {
    label: String,
    offset: RwLock<Vec3>,
}

impl RootOffsetFilter {
    pub fn new(label: impl Into<String>, offset: Vec3) -> Self {
        Self {
            label: label.into(),
            offset: RwLock::new(offset),
        }
    }

    pub fn offset(&self) -> Vec3 {
        *self.offset.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the offset; takes effect on the next processed frame.
    pub fn set_offset(&self, offset: Vec3) {
        *self.offset.write().unwrap_or_else(PoisonError::into_inner) = offset;
        debug!(processor = %self.label, ?offset, "root offset changed");
    }
}

impl SkeletonProcessor for RootOffsetFilter {
    fn label(&self) -> &str {
        &self.label
    }

    fn process_skeleton(&self, skeleton: &mut TrackedSkeleton) {
        let offset = self.offset();
        for transform in skeleton.bones().iter().filter_map(|b| b.transform.as_ref()) {
            transform.set_position(transform.position().add(offset));
        }
    }
}
