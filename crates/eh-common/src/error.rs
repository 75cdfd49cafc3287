//! Error types for the eventhandler.
//!
//! This is the process-boundary error: what the CLI caller can see before
//! an event enters the pipeline. Per-event decide and execute failures are
//! contained inside the pipeline and reported through its outcome value,
//! never through this type.

use thiserror::Error;

/// Result type alias for eventhandler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the eventhandler process surface.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid option pair {0:?}, expected KEY=VALUE")]
    InvalidOptionPair(String),

    #[error("invalid event input: {0}")]
    InvalidEvent(String),

    // Registry errors (20-29)
    #[error("runner {name:?} is not part of the runner collection")]
    RunnerNotFound { name: String },

    #[error("decider {name:?} is not part of the decider collection")]
    DeciderNotFound { name: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidOptionPair(_) => 11,
            Error::InvalidEvent(_) => 12,
            Error::RunnerNotFound { .. } => 20,
            Error::DeciderNotFound { .. } => 21,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
