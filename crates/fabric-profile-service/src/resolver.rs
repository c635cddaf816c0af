//! Profile graph resolution
//!
//! Stored records only name their parents. [`GraphResolver`] loads a record,
//! resolves each parent recursively and builds an immutable [`Profile`] whose
//! parents are the resolved nodes. Nodes are memoized by id for the lifetime
//! of the resolver, so ancestors shared by several branches are built once
//! and shared.

use std::collections::HashMap;
use std::sync::Arc;

use fabric_errors::{ProfileError, Result};
use fabric_profile::{Profile, ProfileBuilder};
use fabric_profile_registry::ProfileRegistry;
use tracing::{debug, trace};

/// Resolves profiles of one version into shared node graphs.
///
/// The resolver does not take the registry lock; callers hold it.
pub struct GraphResolver<'a> {
    registry: &'a dyn ProfileRegistry,
    version_id: &'a str,
    visited: HashMap<String, Arc<Profile>>,
    path: Vec<String>,
}

impl<'a> GraphResolver<'a> {
    /// Create a resolver with an empty memo.
    pub fn new(registry: &'a dyn ProfileRegistry, version_id: &'a str) -> Self {
        Self {
            registry,
            version_id,
            visited: HashMap::new(),
            path: Vec::new(),
        }
    }

    /// Version this resolver reads from.
    pub fn version_id(&self) -> &str {
        self.version_id
    }

    /// Profiles built so far, keyed by id.
    pub fn visited(&self) -> &HashMap<String, Arc<Profile>> {
        &self.visited
    }

    /// Resolve a profile and its whole ancestry.
    ///
    /// Returns `Ok(None)` when the profile itself is not stored.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::ParentNotFound`] if an ancestor is missing
    /// - [`ProfileError::CircularInheritance`] if the ancestry loops back
    /// - registry errors as they occur
    pub fn resolve(&mut self, profile_id: &str) -> Result<Option<Arc<Profile>>> {
        if let Some(profile) = self.visited.get(profile_id) {
            trace!(profile_id, "Reusing resolved profile");
            return Ok(Some(Arc::clone(profile)));
        }

        if let Some(start) = self.path.iter().position(|id| id == profile_id) {
            let mut chain: Vec<&str> = self
                .path
                .get(start..)
                .unwrap_or_default()
                .iter()
                .map(String::as_str)
                .collect();
            chain.push(profile_id);
            return Err(ProfileError::circular_inheritance(chain.join(" -> ")).into());
        }

        let Some(record) = self.registry.get_profile(self.version_id, profile_id)? else {
            return Ok(None);
        };

        let parent_ids: Vec<String> = record.parent_ids().into_iter().map(str::to_string).collect();
        self.path.push(profile_id.to_string());
        let parents = self.resolve_parents(profile_id, &parent_ids);
        self.path.pop();
        let parents = parents?;

        let profile = Arc::new(
            ProfileBuilder::from_record(record)
                .with_parents(parents)
                .build()?,
        );
        debug!(
            version_id = self.version_id,
            profile_id,
            parents = parent_ids.len(),
            "Resolved profile"
        );
        self.visited
            .insert(profile_id.to_string(), Arc::clone(&profile));
        Ok(Some(profile))
    }

    /// Resolve a profile that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] if the profile is not stored, and
    /// every error of [`resolve`](Self::resolve).
    pub fn resolve_required(&mut self, profile_id: &str) -> Result<Arc<Profile>> {
        self.resolve(profile_id)?
            .ok_or_else(|| ProfileError::not_found(self.version_id, profile_id).into())
    }

    fn resolve_parents(
        &mut self,
        profile_id: &str,
        parent_ids: &[String],
    ) -> Result<Vec<Arc<Profile>>> {
        let mut parents = Vec::with_capacity(parent_ids.len());
        for parent_id in parent_ids {
            let parent = self.resolve(parent_id)?.ok_or_else(|| {
                ProfileError::parent_not_found(self.version_id, profile_id, parent_id.as_str())
            })?;
            parents.push(parent);
        }
        Ok(parents)
    }
}
