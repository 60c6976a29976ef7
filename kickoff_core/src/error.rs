// kickoff_core/src/error.rs

//! Error types for the estimation core.
//!
//! Only configuration problems are errors. Missing samples, failed data
//! association and numerical degeneracy are handled in place by the
//! estimators and never surface here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("position history capacity must be at least 1, got {capacity}")]
    InvalidCapacity { capacity: usize },

    #[error("invalid horizon window: min {min} must be >= 1 and <= max {max}")]
    InvalidHorizon { min: usize, max: usize },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl EstimationError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        EstimationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EstimationError>;
