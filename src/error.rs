//! Error types for the experiment harness

use std::path::PathBuf;
use thiserror::Error;

use crate::experiments::MetricKind;

/// Main error type for the experiment harness
#[derive(Error, Debug)]
pub enum HarnessError {
    // Discovery errors
    #[error("Non-existent directory with experiments `{}`.", .path.display())]
    NotFound { path: PathBuf },

    #[error("Could not load module from {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    // Execution errors
    #[error(
        "Running an experiment {experiment} returned output of the type {kind}. It cannot be handled."
    )]
    UnsupportedResultType { experiment: String, kind: String },

    /// Error raised inside an experiment body, passed through untouched
    #[error(transparent)]
    Lua(#[from] mlua::Error),

    // Result validation errors
    #[error("Result for model '{model_name}' ({metric}) has no data points")]
    EmptyDataPoints {
        model_name: String,
        metric: MetricKind,
    },

    #[error("Result for model '{model_name}' has a non-finite data point at index {index}")]
    NonFiniteDataPoint { model_name: String, index: usize },

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the experiment harness
pub type HarnessResult<T> = Result<T, HarnessError>;

impl From<serde_yaml::Error> for HarnessError {
    fn from(err: serde_yaml::Error) -> Self {
        HarnessError::Config(err.to_string())
    }
}
