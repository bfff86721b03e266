//! `marionette-types` – shared vocabulary of the retargeting core.
//!
//! # Modules
//!
//! - [`math`] – [`Vec3`], [`Quaternion`], and world-space [`Pose`].
//! - [`transform`] – [`TransformRef`]: a shared handle to a host-owned
//!   transform.
//! - [`bone`] – [`BoneId`], [`HumanBodyBone`], and the static lookup table
//!   between them.
//! - [`skeleton`] – [`BoneSample`], [`FrameBones`], and
//!   [`TrackedSkeleton`]: the per-frame input produced by the tracker.
//! - [`error`] – [`RigError`], the error type used across the workspace.

pub mod bone;
pub mod error;
pub mod math;
pub mod skeleton;
pub mod transform;

pub use bone::{BoneId, HumanBodyBone};
pub use error::RigError;
pub use math::{Pose, Quaternion, Vec3};
pub use skeleton::{BoneSample, FrameBones, TrackedSkeleton};
pub use transform::TransformRef;
