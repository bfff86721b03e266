//! `marionette-filters` – skeleton processors for the raw tracked skeleton.
//!
//! Register these with a
//! [`SkeletonProcessorAggregator`][marionette_pipeline::SkeletonProcessorAggregator];
//! they run before retargeting, in registration order.
//!
//! - [`smoothing`] – [`SmoothingFilter`]: exponential smoothing of bone poses.
//! - [`offset`] – [`RootOffsetFilter`]: constant world-space shift.

pub mod offset;
pub mod smoothing;

pub use offset::RootOffsetFilter;
pub use smoothing::SmoothingFilter;
