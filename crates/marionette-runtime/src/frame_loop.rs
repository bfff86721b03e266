//! [`FrameDriver`] – drives skeleton filters and the retargeting pipeline
//! once per host frame.
//!
//! ```text
//! TrackedSkeleton ──▶ SkeletonProcessorAggregator ──▶ RetargetingPipeline ──▶ JobHandle
//!                     (filters, in order)            (prepare, process / jobs)
//! ```
//!
//! The driver owns the job scheduler chosen by [`RuntimeConfig::scheduler`].
//! Before a new frame starts, the job chain of the previous frame is always
//! waited on, so deferred work never overlaps the next frame's input.
//!
//! # Example
//!
//! ```rust
//! use marionette_pipeline::RigLayer;
//! use marionette_runtime::{FrameDriver, RuntimeConfig};
//! use marionette_types::TrackedSkeleton;
//!
//! let mut driver = FrameDriver::new(RuntimeConfig::default()).unwrap();
//! let layer = RigLayer::new("avatar");
//! driver.setup(&layer).unwrap();
//!
//! let mut skeleton = TrackedSkeleton::new(Vec::new());
//! driver.run_frame(&layer, &mut skeleton).unwrap();
//! assert_eq!(driver.frame_count(), 1);
//! ```

use marionette_pipeline::{
    GizmoSink, ImmediateScheduler, JobHandle, JobScheduler, RetargetingLayer, RetargetingPipeline,
    SkeletonProcessorAggregator, WorkerPoolScheduler,
};
use marionette_types::{RigError, TrackedSkeleton};
use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::config::{RuntimeConfig, SchedulerKind};

/// Errors raised while building a [`FrameDriver`].
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] std::io::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// FrameDriver
// ────────────────────────────────────────────────────────────────────────────

/// Per-frame orchestration of the retargeting core.
pub struct FrameDriver {
    config: RuntimeConfig,
    aggregator: SkeletonProcessorAggregator,
    pipeline: RetargetingPipeline,
    scheduler: Box<dyn JobScheduler>,
    in_flight: JobHandle,
    frames: u64,
    // Must stay the last field: dropped after the pipeline.
    _pool: Option<tokio::runtime::Runtime>,
}

impl FrameDriver {
    /// Build a driver with the scheduler selected by `config`.
    ///
    /// [`SchedulerKind::WorkerPool`] starts a dedicated Tokio runtime with
    /// `worker_threads` blocking threads.  Do not drop the driver from
    /// inside an async context.
    pub fn new(config: RuntimeConfig) -> Result<Self, DriverError> {
        let (scheduler, pool) = match config.scheduler {
            SchedulerKind::Immediate => (Box::new(ImmediateScheduler) as Box<dyn JobScheduler>, None),
            SchedulerKind::WorkerPool => {
                let threads = config.worker_threads.max(1);
                let pool = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .max_blocking_threads(threads)
                    .thread_name("marionette-job")
                    .build()?;
                let scheduler = WorkerPoolScheduler::new(pool.handle().clone());
                (Box::new(scheduler) as Box<dyn JobScheduler>, Some(pool))
            }
        };
        info!(
            scheduler = %config.scheduler,
            worker_threads = config.worker_threads,
            wait_for_jobs = config.wait_for_jobs,
            "frame driver created"
        );
        Ok(Self::assemble(config, scheduler, pool))
    }

    /// Build a driver around a caller-supplied scheduler.  The scheduler
    /// fields of `config` are ignored.
    pub fn with_scheduler(config: RuntimeConfig, scheduler: Box<dyn JobScheduler>) -> Self {
        Self::assemble(config, scheduler, None)
    }

    fn assemble(
        config: RuntimeConfig,
        scheduler: Box<dyn JobScheduler>,
        pool: Option<tokio::runtime::Runtime>,
    ) -> Self {
        Self {
            config,
            aggregator: SkeletonProcessorAggregator::new(),
            pipeline: RetargetingPipeline::new(),
            scheduler,
            in_flight: JobHandle::completed(),
            frames: 0,
            _pool: pool,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &SkeletonProcessorAggregator {
        &self.aggregator
    }

    /// Register or reorder skeleton processors.
    pub fn aggregator_mut(&mut self) -> &mut SkeletonProcessorAggregator {
        &mut self.aggregator
    }

    pub fn pipeline(&self) -> &RetargetingPipeline {
        &self.pipeline
    }

    /// Register retargeting processors or forward `load_config` calls.
    /// Waits for the in-flight frame first.
    pub fn pipeline_mut(&mut self) -> &mut RetargetingPipeline {
        self.in_flight.wait();
        &mut self.pipeline
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Set up every retargeting processor not yet set up.
    pub fn setup(&mut self, layer: &dyn RetargetingLayer) -> Result<usize, RigError> {
        self.in_flight.wait();
        let count = self.pipeline.setup(layer)?;
        info!(layer = layer.name(), processors = count, "retargeting processors set up");
        Ok(count)
    }

    /// Forward a host recalibration to the pipeline.
    pub fn calibrate(&mut self, layer: &dyn RetargetingLayer, skeleton: &TrackedSkeleton) -> Result<(), RigError> {
        self.in_flight.wait();
        info!(layer = layer.name(), "calibrating retargeting processors");
        self.pipeline.respond_to_calibration(layer, skeleton.bones())
    }

    /// Run one frame.
    ///
    /// Skeleton processors run first and may rewrite `skeleton`.  When the
    /// tracker marks the skeleton invalid, retargeting is skipped for this
    /// frame and a completed handle is returned.
    ///
    /// With `wait_for_jobs` set the returned handle is already complete;
    /// otherwise the caller must wait on it before reading retargeted
    /// transforms.
    pub fn run_frame(
        &mut self,
        layer: &dyn RetargetingLayer,
        skeleton: &mut TrackedSkeleton,
    ) -> Result<JobHandle, RigError> {
        self.in_flight.wait();
        self.frames += 1;
        let span = info_span!("frame", number = self.frames, layer = layer.name());
        let _enter = span.enter();

        let filtered = self.aggregator.run_all(skeleton);
        debug!(filtered, "skeleton processors done");

        if !skeleton.data_valid {
            debug!("skeleton not tracked; retargeting skipped");
            return Ok(JobHandle::completed());
        }

        let bones = skeleton.to_frame_bones();
        let handle = self.pipeline.run_frame(layer, &bones, self.scheduler.as_ref())?;
        if self.config.wait_for_jobs {
            handle.wait();
        }
        self.in_flight = handle.clone();
        Ok(handle)
    }

    /// Forward a debug-visual request to the pipeline, after the in-flight
    /// job chain has finished writing the transforms being drawn.
    pub fn draw_gizmos(&self, gizmos: &mut dyn GizmoSink) {
        self.in_flight.wait();
        self.pipeline.draw_gizmos(gizmos);
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.in_flight.wait();
    }
}
