//! Profile registry backend errors.

use std::path::PathBuf;

use crate::common::ErrorSeverity;

/// Failures raised by a profile registry backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File system operation failed
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A stored document could not be encoded or decoded
    #[error("Failed to (de)serialize {what}: {reason}")]
    Serialization {
        /// What was being (de)serialized
        what: String,
        /// Underlying reason
        reason: String,
    },

    /// Backend-specific failure
    #[error("Registry backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StoreError::Io { .. } => ErrorSeverity::Error,
            StoreError::Serialization { .. } => ErrorSeverity::Error,
            StoreError::Backend(_) => ErrorSeverity::Critical,
        }
    }

    /// Create an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serialization(what: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Serialization {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}
