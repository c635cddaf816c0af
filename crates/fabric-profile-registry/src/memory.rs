//! In-memory registry

use std::collections::BTreeMap;

use fabric_errors::{ProfileError, Result};
use fabric_profile::{ProfileRecord, validate_profile_id, validate_version_id};
use parking_lot::RwLock;
use tracing::debug;

use crate::lock::RegistryLock;
use crate::registry::ProfileRegistry;

#[derive(Debug, Clone, Default)]
struct VersionEntry {
    attributes: BTreeMap<String, String>,
    profiles: BTreeMap<String, ProfileRecord>,
}

/// Registry that keeps every version in process memory.
///
/// Useful for tests and for embedding the service without persistence.
#[derive(Debug, Default)]
pub struct InMemoryProfileRegistry {
    lock: RegistryLock,
    versions: RwLock<BTreeMap<String, VersionEntry>>,
}

impl InMemoryProfileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of versions.
    pub fn len(&self) -> usize {
        self.versions.read().len()
    }

    /// Whether the registry holds no versions.
    pub fn is_empty(&self) -> bool {
        self.versions.read().is_empty()
    }
}

impl ProfileRegistry for InMemoryProfileRegistry {
    fn lock(&self) -> &RegistryLock {
        &self.lock
    }

    fn versions(&self) -> Result<Vec<String>> {
        Ok(self.versions.read().keys().cloned().collect())
    }

    fn has_version(&self, version_id: &str) -> Result<bool> {
        Ok(self.versions.read().contains_key(version_id))
    }

    fn version_attributes(&self, version_id: &str) -> Result<BTreeMap<String, String>> {
        self.versions
            .read()
            .get(version_id)
            .map(|v| v.attributes.clone())
            .ok_or_else(|| ProfileError::version_not_found(version_id).into())
    }

    fn create_version(&self, version_id: &str) -> Result<()> {
        validate_version_id(version_id)?;
        let mut versions = self.versions.write();
        if versions.contains_key(version_id) {
            return Err(ProfileError::VersionAlreadyExists(version_id.to_string()).into());
        }
        versions.insert(version_id.to_string(), VersionEntry::default());
        debug!(version_id, "Created version");
        Ok(())
    }

    fn create_version_from(
        &self,
        parent_id: &str,
        version_id: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        validate_version_id(version_id)?;
        let mut versions = self.versions.write();
        if versions.contains_key(version_id) {
            return Err(ProfileError::VersionAlreadyExists(version_id.to_string()).into());
        }
        let parent = versions
            .get(parent_id)
            .ok_or_else(|| ProfileError::version_not_found(parent_id))?;

        let mut entry = parent.clone();
        entry.attributes.extend(attributes.clone());
        for record in entry.profiles.values_mut() {
            record.version = version_id.to_string();
        }
        versions.insert(version_id.to_string(), entry);
        debug!(parent_id, version_id, "Cloned version");
        Ok(())
    }

    fn set_version_attribute(
        &self,
        version_id: &str,
        key: &str,
        value: Option<&str>,
    ) -> Result<()> {
        let mut versions = self.versions.write();
        let entry = versions
            .get_mut(version_id)
            .ok_or_else(|| ProfileError::version_not_found(version_id))?;
        match value {
            Some(value) => entry.attributes.insert(key.to_string(), value.to_string()),
            None => entry.attributes.remove(key),
        };
        Ok(())
    }

    fn delete_version(&self, version_id: &str) -> Result<()> {
        self.versions
            .write()
            .remove(version_id)
            .map(|_| debug!(version_id, "Deleted version"))
            .ok_or_else(|| ProfileError::version_not_found(version_id).into())
    }

    fn profiles(&self, version_id: &str) -> Result<Vec<String>> {
        self.versions
            .read()
            .get(version_id)
            .map(|v| v.profiles.keys().cloned().collect())
            .ok_or_else(|| ProfileError::version_not_found(version_id).into())
    }

    fn has_profile(&self, version_id: &str, profile_id: &str) -> Result<bool> {
        Ok(self
            .versions
            .read()
            .get(version_id)
            .is_some_and(|v| v.profiles.contains_key(profile_id)))
    }

    fn get_profile(&self, version_id: &str, profile_id: &str) -> Result<Option<ProfileRecord>> {
        Ok(self
            .versions
            .read()
            .get(version_id)
            .and_then(|v| v.profiles.get(profile_id))
            .cloned())
    }

    fn create_profile(&self, record: &ProfileRecord) -> Result<String> {
        validate_profile_id(&record.id)?;
        let mut versions = self.versions.write();
        let entry = versions
            .get_mut(&record.version)
            .ok_or_else(|| ProfileError::version_not_found(&record.version))?;
        if entry.profiles.contains_key(&record.id) {
            return Err(ProfileError::already_exists(&record.version, &record.id).into());
        }
        entry.profiles.insert(record.id.clone(), record.clone());
        debug!(version_id = %record.version, profile_id = %record.id, "Stored new profile");
        Ok(record.id.clone())
    }

    fn update_profile(&self, record: &ProfileRecord) -> Result<String> {
        let mut versions = self.versions.write();
        let slot = versions
            .get_mut(&record.version)
            .and_then(|v| v.profiles.get_mut(&record.id))
            .ok_or_else(|| ProfileError::not_found(&record.version, &record.id))?;
        *slot = record.clone();
        debug!(version_id = %record.version, profile_id = %record.id, "Replaced profile");
        Ok(record.id.clone())
    }

    fn delete_profile(&self, version_id: &str, profile_id: &str) -> Result<()> {
        self.versions
            .write()
            .get_mut(version_id)
            .and_then(|v| v.profiles.remove(profile_id))
            .map(|_| debug!(version_id, profile_id, "Deleted profile"))
            .ok_or_else(|| ProfileError::not_found(version_id, profile_id).into())
    }
}
