//! `marionette-runtime` – host-facing glue for the retargeting core.
//!
//! # Modules
//!
//! - [`frame_loop`] – [`FrameDriver`]: runs skeleton processors, then the
//!   retargeting pipeline, once per host frame.
//! - [`config`] – [`RuntimeConfig`]: scheduler selection and frame-sync
//!   behaviour, loaded from TOML with `MARIONETTE_*` overrides.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: `tracing`
//!   subscriber with optional OTLP export.

pub mod config;
pub mod frame_loop;
pub mod telemetry;

pub use config::{ConfigError, RuntimeConfig, SchedulerKind};
pub use frame_loop::{DriverError, FrameDriver};
