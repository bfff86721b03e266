//! [`RetargetingPipeline`] – ordered retargeting processors and their
//! per-frame lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──setup──▶ SetupDone ──respond_to_calibration──▶ Calibrated
//!                               │                                    │
//!                               └──────────────┬─────────────────────┘
//!                                              ▼
//!                     per frame:  Prepared ──▶ Processed
//! ```
//!
//! Every frame, [`RetargetingPipeline::run_frame`] first calls `prepare` on
//! every enabled processor (in registration order) and only then calls
//! `process` or `process_as_job` on each of them.  A processor's `prepare`
//! therefore never observes another processor's per-frame effect.
//!
//! Job-mode processors are chained: each receives the handle produced by the
//! previous job-mode processor and returns its own.  A synchronous processor
//! first waits for the chain scheduled so far, so effects always land in
//! registration order.  `run_frame` returns the last handle of the chain and
//! does **not** wait on it.
//!
//! # Faults
//!
//! The pipeline is fail-fast.  The first error returned by any processor
//! aborts the rest of that frame and is handed to the caller; if a `prepare`
//! fails no processor runs its `process` step for that frame.  Jobs already
//! scheduled when a later processor fails cannot be cancelled; `run_frame`
//! waits for them before returning the error, so no work of a failed frame
//! is left running.

use std::fmt;
use std::path::Path;

use marionette_types::{BoneSample, FrameBones, RigError};
use tracing::{debug, debug_span, info, warn};
use uuid::Uuid;

use crate::gizmo::GizmoSink;
use crate::jobs::{JobHandle, JobScheduler};
use crate::layer::RetargetingLayer;

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// How a processor performs its per-frame effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorType {
    /// `process` runs on the caller's thread.
    Sync,
    /// `process_as_job` schedules deferred work on a [`JobScheduler`].
    Job,
}

/// Lifecycle state of a registered processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Uninitialized,
    SetupDone,
    Calibrated,
    Prepared,
    Processed,
}

/// Handle identifying one registration in a [`RetargetingPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessorId(Uuid);

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RetargetingProcessor trait
// ────────────────────────────────────────────────────────────────────────────

/// A pluggable per-frame step applied after base retargeting.
///
/// Only [`label`][Self::label], [`processor_type`][Self::processor_type] and
/// [`setup`][Self::setup] are mandatory.  A `Sync` processor overrides
/// [`process`][Self::process]; a `Job` processor overrides
/// [`process_as_job`][Self::process_as_job].
///
/// `bones` is only valid for the duration of the call; implementations must
/// not keep it (job-mode processors may move a clone of the [`FrameBones`]
/// into the job they schedule, which finishes within the frame).
pub trait RetargetingProcessor: Send {
    fn label(&self) -> &str;

    fn processor_type(&self) -> ProcessorType;

    /// One-time initialisation against the rig (resolve bones, build caches).
    fn setup(&mut self, layer: &dyn RetargetingLayer) -> Result<(), RigError>;

    /// Rebuild calibration-dependent caches.  May be called any number of
    /// times.
    fn respond_to_calibration(
        &mut self,
        _layer: &dyn RetargetingLayer,
        _bones: &[BoneSample],
    ) -> Result<(), RigError> {
        Ok(())
    }

    /// Per-frame preparation; runs for every processor before any `process`.
    fn prepare(&mut self, _layer: &dyn RetargetingLayer, _bones: &[BoneSample]) -> Result<(), RigError> {
        Ok(())
    }

    /// Synchronous per-frame effect.
    fn process(&mut self, _layer: &dyn RetargetingLayer, _bones: &[BoneSample]) -> Result<(), RigError> {
        Ok(())
    }

    /// Job-mode per-frame effect: schedule work after `previous` and return
    /// the handle of that work.
    fn process_as_job(
        &mut self,
        previous: &JobHandle,
        _layer: &dyn RetargetingLayer,
        _bones: &FrameBones,
        _scheduler: &dyn JobScheduler,
    ) -> Result<JobHandle, RigError> {
        Ok(previous.clone())
    }

    /// Release acquired resources.  Must tolerate a processor that was never
    /// set up.
    fn clean_up(&mut self) {}

    /// Describe debug visuals.  Never called on the production frame path.
    fn draw_gizmos(&self, _gizmos: &mut dyn GizmoSink) {}

    /// Reconfigure from a JSON file.  Never called while the processor is
    /// mid-frame.
    fn load_config(&mut self, _path: &Path) -> Result<(), RigError> {
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RetargetingPipeline
// ────────────────────────────────────────────────────────────────────────────

struct PipelineEntry {
    id: ProcessorId,
    label: String,
    processor: Box<dyn RetargetingProcessor>,
    enabled: bool,
    state: ProcessorState,
}

/// Outcome of one processor's per-frame step.
enum Step {
    Completed,
    Scheduled(JobHandle),
}

/// Ordered collection of [`RetargetingProcessor`]s driven once per frame.
///
/// # Example
///
/// ```rust
/// use marionette_pipeline::jobs::ImmediateScheduler;
/// use marionette_pipeline::layer::{RetargetingLayer, RigLayer};
/// use marionette_pipeline::retargeting::{ProcessorType, RetargetingPipeline, RetargetingProcessor};
/// use marionette_types::{FrameBones, RigError};
///
/// struct Noop;
/// impl RetargetingProcessor for Noop {
///     fn label(&self) -> &str { "noop" }
///     fn processor_type(&self) -> ProcessorType { ProcessorType::Sync }
///     fn setup(&mut self, _layer: &dyn RetargetingLayer) -> Result<(), RigError> { Ok(()) }
/// }
///
/// let layer = RigLayer::new("avatar");
/// let mut pipeline = RetargetingPipeline::new();
/// pipeline.add(Box::new(Noop));
/// pipeline.setup(&layer).unwrap();
///
/// let bones: FrameBones = Vec::new().into();
/// let done = pipeline.run_frame(&layer, &bones, &ImmediateScheduler).unwrap();
/// done.wait();
/// ```
#[derive(Default)]
pub struct RetargetingPipeline {
    entries: Vec<PipelineEntry>,
}

impl RetargetingPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `processor` (enabled, not yet set up) and return its id.
    pub fn add(&mut self, processor: Box<dyn RetargetingProcessor>) -> ProcessorId {
        let id = ProcessorId(Uuid::new_v4());
        let label = processor.label().to_string();
        info!(
            processor = %label,
            kind = ?processor.processor_type(),
            position = self.entries.len(),
            "retargeting processor registered"
        );
        self.entries.push(PipelineEntry {
            id,
            label,
            processor,
            enabled: true,
            state: ProcessorState::Uninitialized,
        });
        id
    }

    /// Remove a processor, call its `clean_up`, and hand it back.
    ///
    /// Returns `None` for an unknown id.
    pub fn remove(&mut self, id: ProcessorId) -> Option<Box<dyn RetargetingProcessor>> {
        let index = self.index_of(id)?;
        let mut entry = self.entries.remove(index);
        entry.processor.clean_up();
        info!(processor = %entry.label, "retargeting processor removed");
        Some(entry.processor)
    }

    /// Enable or disable a processor.  Returns `false` for an unknown id.
    pub fn set_enabled(&mut self, id: ProcessorId, enabled: bool) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.entries[i].enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn state(&self, id: ProcessorId) -> Option<ProcessorState> {
        self.index_of(id).map(|i| self.entries[i].state)
    }

    /// Labels in execution order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set up every processor that has not been set up yet, in order.
    ///
    /// Already-initialised processors are left alone, so this can be called
    /// again after registering more processors.  Returns how many processors
    /// were set up.
    pub fn setup(&mut self, layer: &dyn RetargetingLayer) -> Result<usize, RigError> {
        let mut count = 0;
        for entry in &mut self.entries {
            if entry.state == ProcessorState::Uninitialized {
                setup_entry(entry, layer)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Set up a single processor.
    ///
    /// # Errors
    ///
    /// [`RigError::OrderingViolation`] if it has already been set up, or
    /// [`RigError::Configuration`] for an unknown id.  Errors from the
    /// processor's own `setup` are passed through.
    pub fn setup_processor(&mut self, id: ProcessorId, layer: &dyn RetargetingLayer) -> Result<(), RigError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| RigError::configuration("retargeting_pipeline", format!("unknown processor {id}")))?;
        let entry = &mut self.entries[index];
        if entry.state != ProcessorState::Uninitialized {
            return Err(RigError::ordering(&entry.label, "setup called more than once"));
        }
        setup_entry(entry, layer)
    }

    /// Forward a host recalibration to every enabled processor.
    ///
    /// # Errors
    ///
    /// [`RigError::OrderingViolation`] if an enabled processor has not been
    /// set up; no processor is notified in that case.
    pub fn respond_to_calibration(
        &mut self,
        layer: &dyn RetargetingLayer,
        bones: &[BoneSample],
    ) -> Result<(), RigError> {
        self.ensure_setup("respond_to_calibration")?;
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            debug!(processor = %entry.label, "responding to calibration");
            entry.processor.respond_to_calibration(layer, bones)?;
            entry.state = ProcessorState::Calibrated;
        }
        Ok(())
    }

    /// Run one frame: `prepare` on every enabled processor, then each
    /// processor's per-frame step.
    ///
    /// Returns the final handle of the job chain ([`JobHandle::completed`]
    /// when no job-mode processor ran).  The caller must wait on it before
    /// reading the bones' transforms.
    ///
    /// # Errors
    ///
    /// [`RigError::OrderingViolation`] if an enabled processor has not been
    /// set up (checked before any processor runs); otherwise the first error
    /// raised by a processor, after which the frame is abandoned once the
    /// jobs it already scheduled have finished.
    pub fn run_frame(
        &mut self,
        layer: &dyn RetargetingLayer,
        bones: &FrameBones,
        scheduler: &dyn JobScheduler,
    ) -> Result<JobHandle, RigError> {
        let span = debug_span!("retargeting_frame", layer = layer.name(), bones = bones.len());
        let _enter = span.enter();

        self.ensure_setup("run_frame")?;

        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            if let Err(e) = entry.processor.prepare(layer, bones) {
                warn!(processor = %entry.label, error = %e, "prepare failed; frame aborted");
                return Err(e);
            }
            entry.state = ProcessorState::Prepared;
        }

        let mut chain = JobHandle::completed();
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            let step = match entry.processor.processor_type() {
                ProcessorType::Sync => {
                    // Earlier jobs may still be writing the transforms this
                    // processor reads.
                    chain.wait();
                    entry.processor.process(layer, bones).map(|()| Step::Completed)
                }
                ProcessorType::Job => entry
                    .processor
                    .process_as_job(&chain, layer, bones, scheduler)
                    .map(Step::Scheduled),
            };
            match step {
                Ok(Step::Completed) => {}
                Ok(Step::Scheduled(handle)) => {
                    debug!(processor = %entry.label, after = chain.id(), job = handle.id(), "job scheduled");
                    chain = handle;
                }
                Err(e) => {
                    warn!(processor = %entry.label, error = %e, "process failed; frame aborted");
                    chain.wait();
                    return Err(e);
                }
            }
            entry.state = ProcessorState::Processed;
        }

        Ok(chain)
    }

    /// Let every enabled, set-up processor describe its debug visuals.
    pub fn draw_gizmos(&self, gizmos: &mut dyn GizmoSink) {
        for entry in self
            .entries
            .iter()
            .filter(|e| e.enabled && e.state != ProcessorState::Uninitialized)
        {
            entry.processor.draw_gizmos(gizmos);
        }
    }

    /// Forward an out-of-band configuration file to one processor.
    pub fn load_config(&mut self, id: ProcessorId, path: &Path) -> Result<(), RigError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| RigError::configuration("retargeting_pipeline", format!("unknown processor {id}")))?;
        let entry = &mut self.entries[index];
        info!(processor = %entry.label, path = %path.display(), "loading processor config");
        entry.processor.load_config(path)
    }

    fn index_of(&self, id: ProcessorId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn ensure_setup(&self, call: &str) -> Result<(), RigError> {
        match self
            .entries
            .iter()
            .find(|e| e.enabled && e.state == ProcessorState::Uninitialized)
        {
            Some(entry) => Err(RigError::ordering(
                &entry.label,
                format!("{call} invoked before setup"),
            )),
            None => Ok(()),
        }
    }
}

impl Drop for RetargetingPipeline {
    fn drop(&mut self) {
        for entry in &mut self.entries {
            entry.processor.clean_up();
        }
    }
}

fn setup_entry(entry: &mut PipelineEntry, layer: &dyn RetargetingLayer) -> Result<(), RigError> {
    entry.processor.setup(layer)?;
    entry.state = ProcessorState::SetupDone;
    debug!(processor = %entry.label, layer = layer.name(), "processor set up");
    Ok(())
}
