//! The profile store interface

use std::collections::BTreeMap;

use fabric_errors::Result;
use fabric_profile::ProfileRecord;

use crate::lock::RegistryLock;

/// Storage for versions and their profile records.
///
/// Individual calls are atomic with respect to each other. Callers that need
/// several calls to observe a consistent registry hold [`lock`](Self::lock)
/// around them; implementations never take that lock themselves.
///
/// Missing versions and profiles are reported as
/// [`fabric_errors::ProfileError`]s wrapped in [`fabric_errors::FabricError`];
/// backend failures as [`fabric_errors::StoreError`]s.
pub trait ProfileRegistry: Send + Sync {
    /// The registry-wide reader/writer lock.
    fn lock(&self) -> &RegistryLock;

    /// Ids of all versions, sorted.
    fn versions(&self) -> Result<Vec<String>>;

    /// Whether a version exists.
    fn has_version(&self, version_id: &str) -> Result<bool>;

    /// Attributes of a version.
    fn version_attributes(&self, version_id: &str) -> Result<BTreeMap<String, String>>;

    /// Create an empty version.
    fn create_version(&self, version_id: &str) -> Result<()>;

    /// Create a version as a copy of `parent_id`: its attributes, overridden
    /// by `attributes`, and all of its profiles.
    fn create_version_from(
        &self,
        parent_id: &str,
        version_id: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Set a version attribute, or remove it when `value` is `None`.
    fn set_version_attribute(&self, version_id: &str, key: &str, value: Option<&str>)
    -> Result<()>;

    /// Delete a version and every profile in it.
    fn delete_version(&self, version_id: &str) -> Result<()>;

    /// Ids of all profiles in a version, sorted.
    fn profiles(&self, version_id: &str) -> Result<Vec<String>>;

    /// Whether a profile exists. A missing version is simply `false`.
    fn has_profile(&self, version_id: &str, profile_id: &str) -> Result<bool>;

    /// Read a profile record; `None` when the version or profile is missing.
    fn get_profile(&self, version_id: &str, profile_id: &str) -> Result<Option<ProfileRecord>>;

    /// Store a new profile and return its id.
    fn create_profile(&self, record: &ProfileRecord) -> Result<String>;

    /// Replace an existing profile and return its id.
    fn update_profile(&self, record: &ProfileRecord) -> Result<String>;

    /// Delete a profile.
    fn delete_profile(&self, version_id: &str, profile_id: &str) -> Result<()>;
}
