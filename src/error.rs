//! Error types for ajustar

use crate::config::ValidationError;
use thiserror::Error;

/// Result type alias for ajustar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ajustar
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Checkpoint storage unavailable at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint already exists: {path}")]
    CheckpointExists { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Prediction count mismatch: task declares {expected} examples, produced {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Cannot average loss for {phase} phase: no samples were accumulated")]
    EmptyPhase { phase: String },

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Training interrupted at epoch {epoch}, step {step}")]
    Interrupted { epoch: usize, step: usize },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {e}"))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::ConfigError(format!("YAML: {e}"))
    }
}

impl Error {
    /// Whether this error is a controlled shutdown rather than a failure
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted { .. })
    }
}
