//! Common error types and utilities used across all fabric crates.
//!
//! This module provides the top-level error enum that wraps the profile and
//! store errors, along with error classification, severity levels, and
//! context helpers.

use core::fmt;

use crate::{ProfileError, StoreError};

/// Top-level error type for the profile fabric.
#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    /// Version and profile errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Registry backend errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Operation invoked on a service that is not active
    #[error("Service {service} is not active")]
    Inactive {
        /// Name of the inactive service
        service: String,
    },

    /// A write to an external collaborator failed
    #[error("{context}: {source}")]
    Persistence {
        /// What was being persisted
        context: String,
        /// Underlying failure
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl FabricError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FabricError::Profile(e) => e.category(),
            FabricError::Store(_) => ErrorCategory::Persistence,
            FabricError::Inactive { .. } => ErrorCategory::InvalidState,
            FabricError::Persistence { .. } => ErrorCategory::Persistence,
            FabricError::Config(_) => ErrorCategory::Config,
            FabricError::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FabricError::Profile(e) => e.severity(),
            FabricError::Store(e) => e.severity(),
            FabricError::Inactive { .. } => ErrorSeverity::Error,
            FabricError::Persistence { .. } => ErrorSeverity::Error,
            FabricError::Config(_) => ErrorSeverity::Error,
            FabricError::Other(_) => ErrorSeverity::Error,
        }
    }

    /// Check if this error is recoverable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Get the profile error, if this wraps one.
    pub fn as_profile_error(&self) -> Option<&ProfileError> {
        match self {
            FabricError::Profile(e) => Some(e),
            _ => None,
        }
    }

    /// Create an inactive service error.
    pub fn inactive(service: impl Into<String>) -> Self {
        FabricError::Inactive {
            service: service.into(),
        }
    }

    /// Wrap a persistence failure with context.
    pub fn persistence(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        FabricError::Persistence {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        FabricError::Config(msg.into())
    }

    /// Create a generic error with a message.
    pub fn other(msg: impl Into<String>) -> Self {
        FabricError::Other(msg.into())
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Missing version, profile or parent
    NotFound = 0,
    /// Parent graph contains a loop
    Cycle = 1,
    /// Write collides with existing data or active assignments
    Conflict = 2,
    /// Store or collaborator read/write failure
    Persistence = 3,
    /// Service invoked while inactive
    InvalidState = 4,
    /// Malformed input
    Invalid = 5,
    /// Configuration errors
    Config = 6,
    /// Other errors
    Other = 255,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::NotFound => write!(f, "NotFound"),
            ErrorCategory::Cycle => write!(f, "Cycle"),
            ErrorCategory::Conflict => write!(f, "Conflict"),
            ErrorCategory::Persistence => write!(f, "Persistence"),
            ErrorCategory::InvalidState => write!(f, "InvalidState"),
            ErrorCategory::Invalid => write!(f, "Invalid"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::Other => write!(f, "Other"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, stored data may be inconsistent
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Context information for errors.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The operation that was being performed
    pub operation: String,
    /// Additional context key-value pairs
    pub context: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: Vec::new(),
        }
    }

    /// Add a context key-value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (key, value) in &self.context {
            write!(f, ", {}: {}", key, value)?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
///
/// Profile and lifecycle errors keep their variant so callers can still
/// classify them. Store failures become [`FabricError::Persistence`] carrying
/// the context; anything else is flattened into [`FabricError::Other`].
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, ctx: ErrorContext) -> Result<T, FabricError>;

    /// Add context with an operation name.
    fn with_context(self, operation: impl Into<String>) -> Result<T, FabricError>;
}

impl<T, E: Into<FabricError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, ctx: ErrorContext) -> Result<T, FabricError> {
        self.map_err(|e| match e.into() {
            e @ (FabricError::Profile(_) | FabricError::Inactive { .. }) => e,
            FabricError::Store(s) => FabricError::persistence(ctx.to_string(), s),
            other => FabricError::Other(format!("{}: {}", ctx, other)),
        })
    }

    fn with_context(self, operation: impl Into<String>) -> Result<T, FabricError> {
        self.context(ErrorContext::new(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::NotFound.to_string(), "NotFound");
        assert_eq!(ErrorCategory::Cycle.to_string(), "Cycle");
        assert_eq!(ErrorCategory::InvalidState.to_string(), "InvalidState");
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_error_context() {
        let ctx = ErrorContext::new("create_profile")
            .with("version", "1.0")
            .with("profile", "base");
        let text = ctx.to_string();
        assert!(text.contains("create_profile"));
        assert!(text.contains("version: 1.0"));
    }

    #[test]
    fn test_fabric_error_category() {
        let err: FabricError = ProfileError::circular_inheritance("a -> a").into();
        assert_eq!(err.category(), ErrorCategory::Cycle);
        assert!(!err.is_recoverable());

        assert_eq!(
            FabricError::inactive("profile-service").category(),
            ErrorCategory::InvalidState
        );
        assert_eq!(
            FabricError::from(StoreError::Backend("x".into())).category(),
            ErrorCategory::Persistence
        );
    }

    #[test]
    fn test_context_keeps_profile_errors_classifiable() {
        let result: Result<(), ProfileError> = Err(ProfileError::not_found("1.0", "a"));
        let err = result.with_context("get_profile").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_context_wraps_store_errors_as_persistence() {
        let result: Result<(), StoreError> = Err(StoreError::Backend("disk full".into()));
        let err = result.with_context("update_profile").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Persistence);
        assert!(err.to_string().contains("update_profile"));
        assert!(err.to_string().contains("disk full"));
    }
}
