//! [`RigError`] – the error type shared by every Marionette crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while configuring or driving the retargeting core.
///
/// Per-frame stale data (a bone sample without a live transform, a mapper
/// target without a matching sample) is *not* an error: it is skipped where
/// it is encountered and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RigError {
    /// A component could not be constructed from its configuration: a
    /// required source is missing or inactive, or a bone cannot be resolved.
    /// Fatal to that component; fix the configuration and rebuild it.
    #[error("Configuration Error in {component}: {details}")]
    Configuration { component: String, details: String },

    /// A lifecycle call arrived out of order (e.g. processing before setup,
    /// or setting up twice).  This is a programming error in the caller.
    #[error("Ordering Violation by {processor}: {details}")]
    OrderingViolation { processor: String, details: String },

    /// An out-of-band configuration file could not be read or parsed.
    #[error("Config Load Error for {path}: {details}")]
    ConfigLoad { path: String, details: String },
}

impl RigError {
    /// Shorthand for [`RigError::Configuration`].
    pub fn configuration(component: impl Into<String>, details: impl Into<String>) -> Self {
        RigError::Configuration {
            component: component.into(),
            details: details.into(),
        }
    }

    /// Shorthand for [`RigError::OrderingViolation`].
    pub fn ordering(processor: impl Into<String>, details: impl Into<String>) -> Self {
        RigError::OrderingViolation {
            processor: processor.into(),
            details: details.into(),
        }
    }
}
