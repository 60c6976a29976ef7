// kickoff_sim/src/error.rs

//! Error types for the scenario runner.

use std::path::PathBuf;

use kickoff_core::error::EstimationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("scenario not found: {0:?}")]
    MissingScenario(PathBuf),

    #[error("no scenario files under {0:?}")]
    NoScenarios(PathBuf),

    #[error("failed to load scenario: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error("estimator configuration rejected: {0}")]
    Estimation(#[from] EstimationError),
}

pub type Result<T> = std::result::Result<T, SimError>;
