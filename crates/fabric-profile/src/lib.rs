//! Versioned configuration profiles
//!
//! A [`Profile`] is a named bundle of configuration files that lives inside a
//! [`Version`] and may inherit from any number of parent profiles of the same
//! version. Parents are held as shared, already-built nodes, so a profile
//! value carries its whole ancestor graph with it.
//!
//! Files whose name ends in `.properties` are also exposed as structured
//! configurations (section name → key/value map), decoded with the codec in
//! [`properties`].

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

mod hash;
pub mod naming;
pub mod profile;
pub mod properties;
pub mod record;
pub mod validation;
pub mod version;

pub use naming::{
    DELETED, ENVIRONMENT_SEPARATOR, PARENTS, PROPERTIES_SUFFIX, environment_variant,
    is_environment_specific, section_name,
};
pub use profile::{Profile, ProfileBuilder};
pub use properties::Properties;
pub use record::ProfileRecord;
pub use validation::{validate_profile_id, validate_version_id};
pub use version::{Version, VersionBuilder};

/// Result type for profile model operations
pub type ProfileResult<T> = Result<T, fabric_errors::ProfileError>;
