//! Error types for fabricctl

use fabric_errors::{ErrorCategory, FabricError, ProfileError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn category(error: &anyhow::Error) -> Option<ErrorCategory> {
    error
        .downcast_ref::<FabricError>()
        .map(FabricError::category)
        .or_else(|| error.downcast_ref::<ProfileError>().map(ProfileError::category))
}

/// Process exit code for a failed command.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match category(error) {
        Some(ErrorCategory::NotFound) => 2,
        Some(ErrorCategory::Cycle) => 3,
        Some(ErrorCategory::Conflict) => 4,
        Some(ErrorCategory::Persistence) => 5,
        _ => 1,
    }
}

/// Short machine-readable name of the error kind.
pub fn error_type_name(error: &anyhow::Error) -> &'static str {
    if let Some(category) = category(error) {
        return match category {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Cycle => "cycle",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Persistence => "persistence",
            ErrorCategory::InvalidState => "invalid_state",
            ErrorCategory::Invalid => "invalid",
            ErrorCategory::Config => "config",
            ErrorCategory::Other => "other",
        };
    }
    match error.downcast_ref::<CliError>() {
        Some(CliError::InvalidArgument(_)) => "invalid_argument",
        Some(CliError::IoError(_)) => "io",
        Some(CliError::JsonError(_)) => "json",
        None => "other",
    }
}
