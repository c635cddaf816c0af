//! Fleet collaborators: container assignments and the requirements document
//!
//! Deleting a profile has to detach it from the containers running it and
//! drop its entry from the fleet requirements. Both live outside the profile
//! registry and are reached through [`FleetService`].

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A running container that may have profiles assigned.
pub trait Container: Send + Sync {
    /// Container identifier.
    fn id(&self) -> &str;

    /// Unassign the given profiles from this container.
    fn remove_profiles(&self, profile_ids: &[&str]) -> io::Result<()>;
}

/// Access to container assignments and fleet requirements.
pub trait FleetService: Send + Sync {
    /// Containers that have `profile_id` of `version_id` assigned.
    fn associated_containers(&self, version_id: &str, profile_id: &str) -> Vec<Arc<dyn Container>>;

    /// Current requirements document.
    fn requirements(&self) -> FleetRequirements;

    /// Replace the requirements document.
    fn set_requirements(&self, requirements: FleetRequirements) -> io::Result<()>;
}

/// Requirements for running one profile across the fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequirements {
    /// Profile the requirement applies to
    pub profile: String,
    /// Minimum number of instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_instances: Option<u32>,
    /// Maximum number of instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_instances: Option<u32>,
    /// Profiles that must be running before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependent_profiles: Vec<String>,
}

impl ProfileRequirements {
    /// Requirement for a profile with no bounds.
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            ..Default::default()
        }
    }

    /// Set the minimum instance count.
    pub fn with_minimum_instances(mut self, minimum: u32) -> Self {
        self.minimum_instances = Some(minimum);
        self
    }

    /// Set the maximum instance count.
    pub fn with_maximum_instances(mut self, maximum: u32) -> Self {
        self.maximum_instances = Some(maximum);
        self
    }

    /// Add a profile this one depends on.
    pub fn with_dependent_profile(mut self, profile: impl Into<String>) -> Self {
        self.dependent_profiles.push(profile.into());
        self
    }
}

/// The fleet requirements document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetRequirements {
    /// Version the requirements were written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Per-profile requirements
    #[serde(default)]
    pub profile_requirements: Vec<ProfileRequirements>,
}

impl FleetRequirements {
    /// Requirements of one profile.
    pub fn find_profile_requirements(&self, profile_id: &str) -> Option<&ProfileRequirements> {
        self.profile_requirements
            .iter()
            .find(|r| r.profile == profile_id)
    }

    /// Add or replace the requirements of a profile.
    pub fn add_or_update_profile_requirements(&mut self, requirements: ProfileRequirements) {
        match self
            .profile_requirements
            .iter_mut()
            .find(|r| r.profile == requirements.profile)
        {
            Some(existing) => *existing = requirements,
            None => self.profile_requirements.push(requirements),
        }
    }

    /// Drop the requirements of a profile. Returns whether anything changed.
    pub fn remove_profile_requirements(&mut self, profile_id: &str) -> bool {
        let before = self.profile_requirements.len();
        self.profile_requirements.retain(|r| r.profile != profile_id);
        self.profile_requirements.len() != before
    }

    /// Whether no profile has requirements.
    pub fn is_empty(&self) -> bool {
        self.profile_requirements.is_empty()
    }
}
