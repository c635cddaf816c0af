//! Overlay computation
//!
//! An overlay is the flattened view of a profile: the file configurations of
//! every ancestor and of the profile itself, merged in inheritance order.
//!
//! Merge rules, applied per file name:
//!
//! - `.properties` files merge key by key. A fragment containing the
//!   [`DELETED`] key clears everything inherited so far; an entry whose value
//!   is [`DELETED`] removes that key.
//! - any other file is replaced wholesale by the last profile defining it.
//! - with an active environment, `<file>#<environment>` is used in place of
//!   `<file>` from the same profile. Names containing `#` are never merged on
//!   their own.

use std::collections::{BTreeMap, HashSet};

use fabric_profile::{
    DELETED, Profile, ProfileBuilder, ProfileResult, Properties, environment_variant,
    is_environment_specific, properties, section_name,
};
use tracing::{debug, trace};

use crate::fingerprint::fingerprint;

/// Ancestors of `profile` followed by `profile` itself.
///
/// Post-order: every parent's ancestry precedes the parent, parents come in
/// declared order, and each profile id appears once, at its first position.
/// An overlay of `profile` found among the ancestors is skipped together with
/// its own ancestry, so an overlay never feeds back into itself. Each id is
/// walked once, so layered diamonds cost linear time.
pub fn inherited_profiles(profile: &Profile) -> Vec<&Profile> {
    fn fill<'a>(
        target: &Profile,
        node: &'a Profile,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<&'a Profile>,
    ) {
        if seen.contains(node.id()) {
            return;
        }
        for parent in node.parents() {
            if parent.is_overlay() && parent.id() == target.id() {
                trace!(profile_id = parent.id(), "Skipping overlay of the target profile");
                continue;
            }
            fill(target, parent, seen, out);
        }
        if seen.insert(node.id()) {
            out.push(node);
        }
    }

    let mut out = Vec::new();
    fill(profile, profile, &mut HashSet::new(), &mut out);
    out
}

/// Merge state: `.properties` accumulators and wholesale files.
#[derive(Debug, Default)]
struct Aggregate {
    properties: BTreeMap<String, Properties>,
    raw: BTreeMap<String, Vec<u8>>,
}

/// Builds overlay profiles for one environment.
#[derive(Debug, Clone, Default)]
pub struct OverlayBuilder {
    environment: Option<String>,
}

impl OverlayBuilder {
    /// Builder with no active environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for an optional environment.
    pub fn for_environment(environment: Option<&str>) -> Self {
        Self {
            environment: environment.map(str::to_string),
        }
    }

    /// Set the active environment.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Active environment, if any.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Compute the overlay of `profile`.
    ///
    /// An overlay is returned unchanged. Otherwise the result carries the
    /// profile's own identity, attributes and parents, the merged files and
    /// configurations, and its [`fingerprint`] as last-modified stamp.
    ///
    /// # Errors
    ///
    /// Returns an error if a `.properties` fragment cannot be decoded.
    pub fn build(&self, profile: &Profile) -> ProfileResult<Profile> {
        if profile.is_overlay() {
            return Ok(profile.clone());
        }

        let mut aggregate = Aggregate::default();
        for ancestor in inherited_profiles(profile) {
            self.supplement(ancestor, &mut aggregate)?;
        }

        let mut files = aggregate.raw;
        let mut configurations = BTreeMap::new();
        for (name, props) in aggregate.properties {
            files.insert(name.clone(), properties::to_bytes(&props));
            if let Some(section) = section_name(&name) {
                configurations.insert(section.to_string(), props);
            }
        }

        let overlay = ProfileBuilder::new(profile.version(), profile.id())
            .with_attributes(profile.attributes().clone())
            .with_parents(profile.parents().to_vec())
            .with_files(files)
            .with_configurations(configurations)
            .with_last_modified(fingerprint(profile))
            .with_overlay(true)
            .build()?;

        debug!(
            version_id = overlay.version(),
            profile_id = overlay.id(),
            environment = self.environment.as_deref().unwrap_or("-"),
            files = overlay.file_configurations().len(),
            "Built overlay profile"
        );
        Ok(overlay)
    }

    fn supplement(&self, profile: &Profile, aggregate: &mut Aggregate) -> ProfileResult<()> {
        let files = profile.file_configurations();
        for (name, content) in files {
            if is_environment_specific(name) {
                continue;
            }

            let content = self
                .environment
                .as_deref()
                .and_then(|env| files.get(&environment_variant(name, env)))
                .unwrap_or(content);

            if section_name(name).is_none() {
                trace!(profile_id = profile.id(), file = %name, "Replacing file");
                aggregate.raw.insert(name.clone(), content.clone());
                continue;
            }

            let mut fragment = properties::parse(name, content)?;
            let merged = aggregate.properties.entry(name.clone()).or_default();

            if fragment.remove(DELETED).is_some() {
                trace!(profile_id = profile.id(), file = %name, "Clearing inherited properties");
                merged.clear();
            }
            for (key, value) in fragment {
                if value == DELETED {
                    merged.remove(&key);
                } else {
                    merged.insert(key, value);
                }
            }
        }
        Ok(())
    }
}
