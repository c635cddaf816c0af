//! Versions: named collections of profiles

use std::collections::BTreeMap;
use std::sync::Arc;

use fabric_errors::ProfileError;

use crate::ProfileResult;
use crate::profile::Profile;
use crate::validation::validate_version_id;

/// A named collection of resolved profiles.
#[derive(Debug, Clone)]
pub struct Version {
    id: String,
    parent_id: Option<String>,
    attributes: BTreeMap<String, String>,
    profiles: BTreeMap<String, Arc<Profile>>,
}

impl Version {
    /// Version identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Version this one was cloned from, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Version attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Profiles keyed by id.
    pub fn profiles(&self) -> &BTreeMap<String, Arc<Profile>> {
        &self.profiles
    }

    /// Ids of all profiles in this version, sorted.
    pub fn profile_ids(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// A single profile.
    pub fn profile(&self, id: &str) -> Option<&Arc<Profile>> {
        self.profiles.get(id)
    }

    /// Whether the version contains the given profile.
    pub fn has_profile(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Version[id={}", self.id)?;
        if let Some(parent) = &self.parent_id {
            write!(f, ",parent={parent}")?;
        }
        write!(f, ",profiles={}]", self.profiles.len())
    }
}

/// Builder for [`Version`] values.
#[derive(Debug, Clone, Default)]
pub struct VersionBuilder {
    id: String,
    parent_id: Option<String>,
    attributes: BTreeMap<String, String>,
    profiles: BTreeMap<String, Arc<Profile>>,
}

impl VersionBuilder {
    /// Start an empty version.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Clone from a parent version when created.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set one attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace all attributes.
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Add a profile, replacing any profile with the same id.
    pub fn with_profile(mut self, profile: impl Into<Arc<Profile>>) -> Self {
        let profile = profile.into();
        self.profiles.insert(profile.id().to_string(), profile);
        self
    }

    /// Add several profiles.
    pub fn with_profiles<I, P>(self, profiles: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Arc<Profile>>,
    {
        let mut builder = self;
        for profile in profiles {
            builder = builder.with_profile(profile);
        }
        builder
    }

    /// Build the version.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is invalid or a profile belongs to another
    /// version.
    pub fn build(self) -> ProfileResult<Version> {
        validate_version_id(&self.id)?;
        if let Some(parent) = &self.parent_id {
            validate_version_id(parent)?;
        }

        if let Some(foreign) = self.profiles.values().find(|p| p.version() != self.id) {
            return Err(ProfileError::invalid_id(
                foreign.id(),
                format!(
                    "profile belongs to version {} not {}",
                    foreign.version(),
                    self.id
                ),
            ));
        }

        Ok(Version {
            id: self.id,
            parent_id: self.parent_id,
            attributes: self.attributes,
            profiles: self.profiles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProfileBuilder;

    #[test]
    fn test_version_collects_profiles_by_id() -> ProfileResult<()> {
        let version = VersionBuilder::new("1.0")
            .with_attribute("locked", "false")
            .with_profile(ProfileBuilder::new("1.0", "b").build()?)
            .with_profile(ProfileBuilder::new("1.0", "a").build()?)
            .build()?;

        assert_eq!(version.profile_ids(), vec!["a", "b"]);
        assert!(version.has_profile("a"));
        assert_eq!(version.attributes().get("locked").map(String::as_str), Some("false"));
        assert_eq!(version.to_string(), "Version[id=1.0,profiles=2]");
        Ok(())
    }

    #[test]
    fn test_version_rejects_foreign_profiles() -> ProfileResult<()> {
        let result = VersionBuilder::new("1.0")
            .with_profile(ProfileBuilder::new("1.1", "a").build()?)
            .build();
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_version_rejects_invalid_parent_id() {
        assert!(VersionBuilder::new("1.1").with_parent("").build().is_err());
    }
}
