//! Common Error Types
//!
//! Errors surfaced to callers of the pipeline. Per-package failures are not
//! represented here; they end up as a terminal [`LoadingState`] on the record.
//!
//! [`LoadingState`]: crate::record::LoadingState

use std::path::PathBuf;

/// Pipeline-level error
#[derive(Debug, thiserror::Error)]
pub enum DatamodError {
    /// A discovery-window operation was attempted after the candidate pool froze.
    #[error("Invalid pipeline state: {0}")]
    InvalidState(&'static str),

    #[error("Duplicate handler: '{0}' is already registered")]
    DuplicateHandler(String),

    #[error("Invalid version '{input}': {source}")]
    Version {
        input: String,
        #[source]
        source: semver::Error,
    },

    #[error("Configuration error in {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatamodError {
    /// Create a configuration error for the given file
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a lifecycle misuse rather than an environment problem
    pub fn is_invalid_usage(&self) -> bool {
        matches!(self, Self::InvalidState(_) | Self::DuplicateHandler(_))
    }
}
