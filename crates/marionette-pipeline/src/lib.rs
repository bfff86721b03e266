//! `marionette-pipeline` – per-frame processing around retargeting.
//!
//! # Modules
//!
//! - [`retargeting`] – [`RetargetingPipeline`][retargeting::RetargetingPipeline]:
//!   ordered [`RetargetingProcessor`][retargeting::RetargetingProcessor]s with
//!   a setup / calibration / prepare / process lifecycle.  Each processor runs
//!   either synchronously or as a dependency-chained job.
//! - [`skeleton`] – [`SkeletonProcessorAggregator`][skeleton::SkeletonProcessorAggregator]:
//!   ordered, enable-able filters over the raw tracked skeleton.
//! - [`jobs`] – [`JobHandle`][jobs::JobHandle] and the
//!   [`JobScheduler`][jobs::JobScheduler] implementations used by job-mode
//!   processors.
//! - [`layer`] – [`RetargetingLayer`][layer::RetargetingLayer]: the host rig as
//!   seen by processors, plus the in-memory [`RigLayer`][layer::RigLayer].
//! - [`gizmo`] – [`GizmoSink`][gizmo::GizmoSink]: the debug-visual hook.

pub mod gizmo;
pub mod jobs;
pub mod layer;
pub mod retargeting;
pub mod skeleton;

pub use gizmo::{GizmoPrimitive, GizmoRecorder, GizmoSink};
pub use jobs::{ImmediateScheduler, Job, JobCompleter, JobHandle, JobScheduler, WorkerPoolScheduler};
pub use layer::{RetargetingLayer, RigLayer};
pub use retargeting::{ProcessorId, ProcessorState, ProcessorType, RetargetingPipeline, RetargetingProcessor};
pub use skeleton::{SkeletonProcessor, SkeletonProcessorAggregator};
