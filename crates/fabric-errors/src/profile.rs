//! Version and profile error types.
//!
//! Covers lookups that miss, inheritance graphs that cannot be resolved,
//! writes that collide with existing data and deletes blocked by fleet
//! assignments.

use crate::common::{ErrorCategory, ErrorSeverity};

/// Version and profile errors.
///
/// # Examples
///
/// ```
/// use fabric_errors::{ErrorCategory, ProfileError};
///
/// let err = ProfileError::not_found("1.0", "base");
/// assert_eq!(err.category(), ErrorCategory::NotFound);
///
/// let err = ProfileError::circular_inheritance("a -> b -> a");
/// assert!(err.is_inheritance_error());
/// assert_eq!(err.category(), ErrorCategory::Cycle);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// Profile not found in the given version
    #[error("Profile not found: {version}/{profile}")]
    NotFound {
        /// Version identifier
        version: String,
        /// Profile identifier
        profile: String,
    },

    /// Version not found
    #[error("Version '{0}' does not exist")]
    VersionNotFound(String),

    /// A parent named by a profile could not be resolved
    #[error("Cannot obtain parent profile {parent} of {version}/{profile}")]
    ParentNotFound {
        /// Version identifier
        version: String,
        /// Child profile identifier
        profile: String,
        /// Missing parent identifier
        parent: String,
    },

    /// Circular inheritance detected
    #[error("Circular profile inheritance detected: {chain}")]
    CircularInheritance {
        /// The inheritance chain that closes the loop
        chain: String,
    },

    /// Profile already exists
    #[error("Profile already exists: {version}/{profile}")]
    AlreadyExists {
        /// Version identifier
        version: String,
        /// Profile identifier
        profile: String,
    },

    /// Version already exists
    #[error("Version '{0}' already exists")]
    VersionAlreadyExists(String),

    /// Invalid version or profile identifier
    #[error("Invalid id '{id}': {reason}")]
    InvalidId {
        /// The rejected identifier
        id: String,
        /// Why it was rejected
        reason: String,
    },

    /// Delete refused because containers still use the profile
    #[error(
        "Cannot delete profile {profile}. Profile has {count} assigned container(s): {list}. Use force option to also remove the profile from the containers.",
        count = .containers.len(),
        list = .containers.join(" ")
    )]
    AssignedToContainers {
        /// Profile identifier
        profile: String,
        /// Identifiers of the assigned containers
        containers: Vec<String>,
    },

    /// Configuration fragment could not be decoded
    #[error("Invalid format in {source_name}: {reason}")]
    InvalidFormat {
        /// File or fragment name
        source_name: String,
        /// Reason for the format error
        reason: String,
    },
}

impl ProfileError {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProfileError::NotFound { .. }
            | ProfileError::VersionNotFound(_)
            | ProfileError::ParentNotFound { .. } => ErrorCategory::NotFound,
            ProfileError::CircularInheritance { .. } => ErrorCategory::Cycle,
            ProfileError::AlreadyExists { .. }
            | ProfileError::VersionAlreadyExists(_)
            | ProfileError::AssignedToContainers { .. } => ErrorCategory::Conflict,
            ProfileError::InvalidId { .. } | ProfileError::InvalidFormat { .. } => {
                ErrorCategory::Invalid
            }
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProfileError::CircularInheritance { .. } => ErrorSeverity::Critical,
            ProfileError::AssignedToContainers { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Check if this error is related to profile inheritance.
    pub fn is_inheritance_error(&self) -> bool {
        matches!(
            self,
            ProfileError::CircularInheritance { .. } | ProfileError::ParentNotFound { .. }
        )
    }

    /// Create a not found error.
    pub fn not_found(version: impl Into<String>, profile: impl Into<String>) -> Self {
        ProfileError::NotFound {
            version: version.into(),
            profile: profile.into(),
        }
    }

    /// Create a version not found error.
    pub fn version_not_found(version: impl Into<String>) -> Self {
        ProfileError::VersionNotFound(version.into())
    }

    /// Create a parent not found error.
    pub fn parent_not_found(
        version: impl Into<String>,
        profile: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        ProfileError::ParentNotFound {
            version: version.into(),
            profile: profile.into(),
            parent: parent.into(),
        }
    }

    /// Create a circular inheritance error.
    pub fn circular_inheritance(chain: impl Into<String>) -> Self {
        ProfileError::CircularInheritance {
            chain: chain.into(),
        }
    }

    /// Create an already exists error.
    pub fn already_exists(version: impl Into<String>, profile: impl Into<String>) -> Self {
        ProfileError::AlreadyExists {
            version: version.into(),
            profile: profile.into(),
        }
    }

    /// Create an invalid id error.
    pub fn invalid_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ProfileError::InvalidId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid format error.
    pub fn invalid_format(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ProfileError::InvalidFormat {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
