//! Error taxonomy for baseline computation, classification and storage

use thiserror::Error;

/// Errors raised by the analysis pipeline and its collaborators
#[derive(Error, Debug)]
pub enum OutlierError {
    /// A population or metric has fewer observations than required.
    ///
    /// Never retried internally: callers decide whether to abort or to
    /// retry with more data or a lower minimum.
    #[error("Insufficient data for {context}: need at least {required} samples, got {actual}")]
    InsufficientData {
        required: usize,
        actual: usize,
        context: String,
    },

    /// A precondition on an entity or parameter does not hold
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),
}

impl OutlierError {
    pub(crate) fn insufficient(required: usize, actual: usize, context: impl Into<String>) -> Self {
        OutlierError::InsufficientData {
            required,
            actual,
            context: context.into(),
        }
    }

    /// True for the "retry with more data" class of failures
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, OutlierError::InsufficientData { .. })
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, OutlierError>;
