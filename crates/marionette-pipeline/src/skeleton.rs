//! [`SkeletonProcessorAggregator`] – ordered post-filters for the raw
//! tracked skeleton.
//!
//! Skeleton processors run before (and independently of) retargeting.  The
//! aggregator keeps them in registration order and invokes every enabled one
//! on each call to [`SkeletonProcessorAggregator::run_all`].  It does no
//! cross-processor coordination: the only guarantee is stable, in-order
//! execution.

use std::sync::Arc;

use marionette_types::{RigError, TrackedSkeleton};
use tracing::{debug, info};

// ────────────────────────────────────────────────────────────────────────────
// SkeletonProcessor trait
// ────────────────────────────────────────────────────────────────────────────

/// A filter applied to the raw tracked skeleton.
///
/// Processors are shared (`Arc`) between the aggregator and whoever created
/// them, so `process_skeleton` takes `&self`; stateful filters keep their
/// state behind interior mutability.
pub trait SkeletonProcessor: Send + Sync {
    /// Read-only label for diagnostics and ordering UIs.
    fn label(&self) -> &str;

    /// Apply the filter to `skeleton` in place.
    fn process_skeleton(&self, skeleton: &mut TrackedSkeleton);
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregator
// ────────────────────────────────────────────────────────────────────────────

struct SkeletonEntry {
    processor: Arc<dyn SkeletonProcessor>,
    enabled: bool,
    label: String,
}

/// Ordered, enable-able collection of [`SkeletonProcessor`]s.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use marionette_pipeline::skeleton::{SkeletonProcessor, SkeletonProcessorAggregator};
/// use marionette_types::TrackedSkeleton;
///
/// struct Invalidate;
/// impl SkeletonProcessor for Invalidate {
///     fn label(&self) -> &str { "invalidate" }
///     fn process_skeleton(&self, skeleton: &mut TrackedSkeleton) { skeleton.data_valid = false; }
/// }
///
/// let mut aggregator = SkeletonProcessorAggregator::new();
/// let invalidate: Arc<dyn SkeletonProcessor> = Arc::new(Invalidate);
/// aggregator.add(Arc::clone(&invalidate)).unwrap();
///
/// let mut skeleton = TrackedSkeleton::new(Vec::new());
/// aggregator.set_enabled(&invalidate, false);
/// aggregator.run_all(&mut skeleton);
/// assert!(skeleton.data_valid);
///
/// aggregator.set_enabled(&invalidate, true);
/// aggregator.run_all(&mut skeleton);
/// assert!(!skeleton.data_valid);
/// ```
#[derive(Default)]
pub struct SkeletonProcessorAggregator {
    entries: Vec<SkeletonEntry>,
}

impl SkeletonProcessorAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `processor` to the end of the execution order, enabled.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::Configuration`] if this exact processor instance
    /// is already registered.
    pub fn add(&mut self, processor: Arc<dyn SkeletonProcessor>) -> Result<(), RigError> {
        if self.position(&processor).is_some() {
            return Err(RigError::configuration(
                "skeleton_aggregator",
                format!("processor '{}' is already registered", processor.label()),
            ));
        }
        let label = processor.label().to_string();
        info!(processor = %label, position = self.entries.len(), "skeleton processor registered");
        self.entries.push(SkeletonEntry {
            processor,
            enabled: true,
            label,
        });
        Ok(())
    }

    /// Remove the first entry for `processor`.  Returns `false` (and does
    /// nothing) when it is not registered.
    pub fn remove(&mut self, processor: &Arc<dyn SkeletonProcessor>) -> bool {
        match self.position(processor) {
            Some(index) => {
                let entry = self.entries.remove(index);
                info!(processor = %entry.label, "skeleton processor removed");
                true
            }
            None => false,
        }
    }

    /// Enable or disable `processor`.  Returns `false` when it is not
    /// registered.
    pub fn set_enabled(&mut self, processor: &Arc<dyn SkeletonProcessor>, enabled: bool) -> bool {
        match self.position(processor) {
            Some(index) => {
                self.entries[index].enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// `Some(enabled)` for a registered processor, `None` otherwise.
    pub fn is_enabled(&self, processor: &Arc<dyn SkeletonProcessor>) -> Option<bool> {
        self.position(processor).map(|i| self.entries[i].enabled)
    }

    /// Labels of every registered processor, in execution order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every enabled processor on `skeleton`, in registration order.
    ///
    /// Returns the number of processors invoked.
    pub fn run_all(&self, skeleton: &mut TrackedSkeleton) -> usize {
        let mut invoked = 0;
        for entry in self.entries.iter().filter(|e| e.enabled) {
            debug!(processor = %entry.label, "processing skeleton");
            entry.processor.process_skeleton(skeleton);
            invoked += 1;
        }
        invoked
    }

    fn position(&self, processor: &Arc<dyn SkeletonProcessor>) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| Arc::ptr_eq(&e.processor, processor))
    }
}
