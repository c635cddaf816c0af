//! Profile nodes and their builder

use std::collections::BTreeMap;
use std::sync::Arc;

use fabric_errors::ProfileError;

use crate::hash::profile_hash;
use crate::properties::{self, Properties};
use crate::record::ProfileRecord;
use crate::validation::{validate_profile_id, validate_version_id};
use crate::{PARENTS, ProfileResult, section_name};

/// An immutable profile node.
///
/// Parents are resolved nodes shared through [`Arc`], so sibling branches of
/// a diamond shaped hierarchy point at the same ancestor instance.
#[derive(Debug, Clone)]
pub struct Profile {
    version: String,
    id: String,
    attributes: BTreeMap<String, String>,
    parents: Vec<Arc<Profile>>,
    file_configurations: BTreeMap<String, Vec<u8>>,
    configurations: BTreeMap<String, Properties>,
    profile_hash: String,
    last_modified: Option<String>,
    overlay: bool,
}

impl Profile {
    /// Version this profile belongs to.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Profile identifier, unique within its version.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All attributes, including [`PARENTS`].
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// A single attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Resolved parent nodes in declared order.
    pub fn parents(&self) -> &[Arc<Profile>] {
        &self.parents
    }

    /// Parent ids in declared order.
    pub fn parent_ids(&self) -> Vec<&str> {
        self.parents.iter().map(|p| p.id()).collect()
    }

    /// File name to raw content.
    pub fn file_configurations(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.file_configurations
    }

    /// Raw content of one file.
    pub fn file_configuration(&self, name: &str) -> Option<&[u8]> {
        self.file_configurations.get(name).map(Vec::as_slice)
    }

    /// Structured configurations keyed by section name.
    pub fn configurations(&self) -> &BTreeMap<String, Properties> {
        &self.configurations
    }

    /// Structured configuration of one section.
    pub fn configuration(&self, section: &str) -> Option<&Properties> {
        self.configurations.get(section)
    }

    /// SHA-256 over this profile's content and its parents' hashes.
    ///
    /// Changes whenever this profile or any of its ancestors changes.
    pub fn profile_hash(&self) -> &str {
        &self.profile_hash
    }

    /// Fingerprint stamped on overlays; `None` for raw profiles.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Whether this profile is a computed overlay.
    pub fn is_overlay(&self) -> bool {
        self.overlay
    }

    /// Storable projection of this profile.
    pub fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            version: self.version.clone(),
            id: self.id.clone(),
            attributes: self.attributes.clone(),
            file_configurations: self.file_configurations.clone(),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Profile[ver={},id={}", self.version, self.id)?;
        if !self.parents.is_empty() {
            write!(f, ",parents={}", self.parent_ids().join(" "))?;
        }
        if self.overlay {
            write!(f, ",overlay")?;
        }
        write!(f, "]")
    }
}

/// Builder for [`Profile`] nodes.
///
/// ```
/// use std::sync::Arc;
/// use fabric_profile::ProfileBuilder;
///
/// # fn main() -> Result<(), fabric_errors::ProfileError> {
/// let base = Arc::new(
///     ProfileBuilder::new("1.0", "base")
///         .with_file("app.properties", b"a=1\n".to_vec())
///         .build()?,
/// );
/// let child = ProfileBuilder::new("1.0", "child")
///     .with_parent(base)
///     .build()?;
///
/// assert_eq!(child.attribute("parents"), Some("base"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    version: String,
    id: String,
    attributes: BTreeMap<String, String>,
    parents: Vec<Arc<Profile>>,
    file_configurations: BTreeMap<String, Vec<u8>>,
    configurations: Option<BTreeMap<String, Properties>>,
    last_modified: Option<String>,
    overlay: bool,
}

impl ProfileBuilder {
    /// Start an empty profile.
    pub fn new(version: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    /// Start from a stored record. Parents still have to be attached.
    pub fn from_record(record: ProfileRecord) -> Self {
        Self {
            version: record.version,
            id: record.id,
            attributes: record.attributes,
            file_configurations: record.file_configurations,
            ..Default::default()
        }
    }

    /// Start from an existing profile, keeping its parents and content.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            version: profile.version.clone(),
            id: profile.id.clone(),
            attributes: profile.attributes.clone(),
            parents: profile.parents.clone(),
            file_configurations: profile.file_configurations.clone(),
            configurations: None,
            last_modified: profile.last_modified.clone(),
            overlay: profile.overlay,
        }
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

    /// Append a parent.
    pub fn with_parent(mut self, parent: Arc<Profile>) -> Self {
        self.parents.push(parent);
        self
    }

    /// Replace all parents.
    pub fn with_parents(mut self, parents: Vec<Arc<Profile>>) -> Self {
        self.parents = parents;
        self
    }

    /// Set one file.
    pub fn with_file(mut self, name: impl Into<String>, content: Vec<u8>) -> Self {
        self.file_configurations.insert(name.into(), content);
        self
    }

    /// Replace all files.
    pub fn with_files(mut self, files: BTreeMap<String, Vec<u8>>) -> Self {
        self.file_configurations = files;
        self
    }

    /// Set a `.properties` file from decoded key/value pairs.
    ///
    /// `file_name` is used verbatim, so environment variants such as
    /// `db.properties#prod` can be written the same way.
    pub fn with_properties(self, file_name: impl Into<String>, props: &Properties) -> Self {
        self.with_file(file_name, properties::to_bytes(props))
    }

    /// Use explicit structured configurations instead of deriving them.
    pub fn with_configurations(mut self, configurations: BTreeMap<String, Properties>) -> Self {
        self.configurations = Some(configurations);
        self
    }

    /// Stamp a fingerprint.
    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    /// Mark the profile as a computed overlay.
    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    /// Build the profile.
    ///
    /// When parents are attached, the [`PARENTS`] attribute is rewritten to
    /// match them. Structured configurations are decoded from the
    /// `.properties` files unless they were given explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is invalid, a parent belongs to another
    /// version or a `.properties` file cannot be decoded.
    pub fn build(self) -> ProfileResult<Profile> {
        validate_version_id(&self.version)?;
        validate_profile_id(&self.id)?;

        if let Some(foreign) = self.parents.iter().find(|p| p.version != self.version) {
            return Err(ProfileError::invalid_id(
                foreign.id(),
                format!(
                    "parent belongs to version {} but {} is in version {}",
                    foreign.version, self.id, self.version
                ),
            ));
        }

        let mut attributes = self.attributes;
        if !self.parents.is_empty() {
            let ids: Vec<&str> = self.parents.iter().map(|p| p.id()).collect();
            attributes.insert(PARENTS.to_string(), ids.join(" "));
        }

        let configurations = match self.configurations {
            Some(configurations) => configurations,
            None => derive_configurations(&self.file_configurations)?,
        };

        let profile_hash = profile_hash(
            &self.version,
            &self.id,
            &attributes,
            &self.file_configurations,
            self.parents.iter().map(|p| p.profile_hash()),
        );

        Ok(Profile {
            version: self.version,
            id: self.id,
            attributes,
            parents: self.parents,
            file_configurations: self.file_configurations,
            configurations,
            profile_hash,
            last_modified: self.last_modified,
            overlay: self.overlay,
        })
    }
}

fn derive_configurations(
    files: &BTreeMap<String, Vec<u8>>,
) -> ProfileResult<BTreeMap<String, Properties>> {
    let mut configurations = BTreeMap::new();
    for (name, content) in files {
        if let Some(section) = section_name(name) {
            configurations.insert(section.to_string(), properties::parse(name, content)?);
        }
    }
    Ok(configurations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn must<T, E: std::fmt::Debug>(r: Result<T, E>) -> T {
        match r {
            Ok(v) => v,
            Err(e) => panic!("must() failed: {:?}", e),
        }
    }

    #[test]
    fn test_configurations_derived_from_properties_files() {
        let profile = must(
            ProfileBuilder::new("1.0", "p")
                .with_file("app.properties", b"a=1\nb=2\n".to_vec())
                .with_file("app.properties#prod", b"a=9\n".to_vec())
                .with_file("jetty.xml", b"<Configure/>".to_vec())
                .build(),
        );

        assert_eq!(profile.configurations().len(), 1);
        let app = must(profile.configuration("app").ok_or("missing app"));
        assert_eq!(app.get("a").map(String::as_str), Some("1"));
        assert_eq!(app.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parents_attribute_follows_parent_nodes() {
        let a = Arc::new(must(ProfileBuilder::new("1.0", "a").build()));
        let b = Arc::new(must(ProfileBuilder::new("1.0", "b").build()));
        let child = must(
            ProfileBuilder::new("1.0", "child")
                .with_attribute(PARENTS, "stale")
                .with_parent(a)
                .with_parent(b)
                .build(),
        );

        assert_eq!(child.attribute(PARENTS), Some("a b"));
        assert_eq!(child.parent_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_parent_from_other_version_rejected() {
        let foreign = Arc::new(must(ProfileBuilder::new("2.0", "base").build()));
        let result = ProfileBuilder::new("1.0", "child")
            .with_parent(foreign)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_hash_changes_with_ancestor_content() {
        let root_v1 = Arc::new(must(
            ProfileBuilder::new("1.0", "root")
                .with_file("a.properties", b"x=1\n".to_vec())
                .build(),
        ));
        let root_v2 = Arc::new(must(
            ProfileBuilder::new("1.0", "root")
                .with_file("a.properties", b"x=2\n".to_vec())
                .build(),
        ));
        let mid_v1 = Arc::new(must(
            ProfileBuilder::new("1.0", "mid").with_parent(root_v1).build(),
        ));
        let mid_v2 = Arc::new(must(
            ProfileBuilder::new("1.0", "mid").with_parent(root_v2).build(),
        ));
        let leaf_v1 = must(ProfileBuilder::new("1.0", "leaf").with_parent(mid_v1).build());
        let leaf_v2 = must(ProfileBuilder::new("1.0", "leaf").with_parent(mid_v2).build());

        assert_ne!(leaf_v1.profile_hash(), leaf_v2.profile_hash());
    }

    #[test]
    fn test_record_round_trip_keeps_content() {
        let profile = must(
            ProfileBuilder::new("1.0", "p")
                .with_attribute("abstract", "true")
                .with_file("f.txt", b"hello".to_vec())
                .build(),
        );
        let rebuilt = must(ProfileBuilder::from_record(profile.to_record()).build());
        assert_eq!(rebuilt.profile_hash(), profile.profile_hash());
    }

    #[test]
    fn test_invalid_properties_fail_build() {
        let result = ProfileBuilder::new("1.0", "p")
            .with_file("bad.properties", vec![0xff])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        let base = Arc::new(must(ProfileBuilder::new("1.0", "base").build()));
        let child = must(ProfileBuilder::new("1.0", "child").with_parent(base).build());
        assert_eq!(child.to_string(), "Profile[ver=1.0,id=child,parents=base]");
    }
}
