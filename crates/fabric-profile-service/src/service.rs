//! Version and profile service facade

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fabric_errors::{FabricError, ProfileError, Result, ResultExt, error_context};
use fabric_profile::{Profile, ProfileRecord, Version, VersionBuilder};
use fabric_profile_registry::ProfileRegistry;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::ProfileServiceConfig;
use crate::fleet::FleetService;
use crate::overlay::OverlayBuilder;
use crate::resolver::GraphResolver;

/// Lifecycle state of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Constructed or stopped; every operation is rejected
    Inactive,
    /// Started and serving requests
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Create,
    Update,
}

/// Profiles written by one facade call.
///
/// `undo` holds every record written, in write order, with the record it
/// replaced (`None` for a created profile).
#[derive(Default)]
struct WriteBatch {
    written: HashMap<String, Arc<Profile>>,
    undo: Vec<(ProfileRecord, Option<ProfileRecord>)>,
}

/// Service for reading, writing and overlaying versioned profiles.
///
/// Reads hold the registry's read lock while the profile graph is resolved;
/// writes hold the write lock for the whole operation. The registry lock is
/// not re-entrant, so internal helpers never acquire it.
pub struct ProfileService {
    registry: Arc<dyn ProfileRegistry>,
    config: ProfileServiceConfig,
    state: Mutex<ServiceState>,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ProfileService {
    /// Create an inactive service over `registry`.
    pub fn new(registry: Arc<dyn ProfileRegistry>, config: ProfileServiceConfig) -> Self {
        Self {
            registry,
            config,
            state: Mutex::new(ServiceState::Inactive),
        }
    }

    /// Activate the service.
    pub fn start(&self) {
        let mut state = self.state.lock();
        if *state != ServiceState::Active {
            *state = ServiceState::Active;
            info!(
                service = %self.config.service_name,
                environment = self.config.environment.as_deref().unwrap_or("-"),
                "Profile service started"
            );
        }
    }

    /// Deactivate the service.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state != ServiceState::Inactive {
            *state = ServiceState::Inactive;
            info!(service = %self.config.service_name, "Profile service stopped");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    /// Whether the service is active.
    pub fn is_active(&self) -> bool {
        self.state() == ServiceState::Active
    }

    /// Service configuration.
    pub fn config(&self) -> &ProfileServiceConfig {
        &self.config
    }

    /// The registry this service reads and writes.
    pub fn registry(&self) -> &Arc<dyn ProfileRegistry> {
        &self.registry
    }

    fn assert_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(FabricError::inactive(&self.config.service_name))
        }
    }

    // ---------------------------------------------------------------------
    // Versions
    // ---------------------------------------------------------------------

    /// Ids of all versions.
    pub fn versions(&self) -> Result<Vec<String>> {
        self.assert_active()?;
        self.registry.versions()
    }

    /// Whether a version exists.
    pub fn has_version(&self, version_id: &str) -> Result<bool> {
        self.assert_active()?;
        self.registry.has_version(version_id)
    }

    /// A version with all of its profiles resolved, or `None`.
    pub fn version(&self, version_id: &str) -> Result<Option<Version>> {
        self.assert_active()?;
        let _read = self.registry.lock().read();
        self.version_internal(version_id)
    }

    /// A version that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::VersionNotFound`] if the version is missing.
    pub fn required_version(&self, version_id: &str) -> Result<Version> {
        self.version(version_id)?
            .ok_or_else(|| ProfileError::version_not_found(version_id).into())
    }

    /// Create a version.
    ///
    /// With a parent id the parent is cloned in the registry. Otherwise an
    /// empty version is created, its attributes set and its profiles created
    /// parents first. Returns the version as stored. If a profile write
    /// fails, the new version is deleted again.
    pub fn create_version(&self, version: &Version) -> Result<Version> {
        self.assert_active()?;
        let _write = self.registry.lock().write();
        info!(version_id = version.id(), parent_id = ?version.parent_id(), "Creating version");

        let version_id = version.id();
        match version.parent_id() {
            Some(parent_id) => {
                self.registry
                    .create_version_from(parent_id, version_id, version.attributes())?;
            }
            None => {
                for profile in version.profiles().values() {
                    ensure_acyclic(profile)?;
                }
                self.registry.create_version(version_id)?;
                if let Err(err) = self.populate_version_internal(version) {
                    warn!(version_id, error = %err, "Rolling back version creation");
                    self.registry
                        .delete_version(version_id)
                        .context(error_context!("roll back version creation", "version" => version_id))?;
                    return Err(err);
                }
            }
        }

        self.version_internal(version_id)?
            .ok_or_else(|| ProfileError::version_not_found(version_id).into())
    }

    fn populate_version_internal(&self, version: &Version) -> Result<()> {
        let version_id = version.id();
        for (key, value) in version.attributes() {
            self.registry
                .set_version_attribute(version_id, key, Some(value))?;
        }
        let mut batch = WriteBatch::default();
        for profile in version.profiles().values() {
            self.write_profile_internal(profile, WriteMode::Create, false, &mut batch)?;
        }
        Ok(())
    }

    /// Delete a version and all of its profiles.
    pub fn delete_version(&self, version_id: &str) -> Result<()> {
        self.assert_active()?;
        let _write = self.registry.lock().write();
        info!(version_id, "Deleting version");
        self.registry.delete_version(version_id)
    }

    fn version_internal(&self, version_id: &str) -> Result<Option<Version>> {
        if !self.registry.has_version(version_id)? {
            return Ok(None);
        }

        let mut resolver = GraphResolver::new(self.registry.as_ref(), version_id);
        let mut builder = VersionBuilder::new(version_id)
            .with_attributes(self.registry.version_attributes(version_id)?);
        for profile_id in self.registry.profiles(version_id)? {
            builder = builder.with_profile(resolver.resolve_required(&profile_id)?);
        }
        debug!(version_id, profiles = resolver.visited().len(), "Resolved version");
        Ok(Some(builder.build()?))
    }

    // ---------------------------------------------------------------------
    // Profiles
    // ---------------------------------------------------------------------

    /// Whether a profile exists.
    pub fn has_profile(&self, version_id: &str, profile_id: &str) -> Result<bool> {
        self.assert_active()?;
        self.registry.has_profile(version_id, profile_id)
    }

    /// A profile with its ancestry resolved, or `None` if it is not stored.
    ///
    /// # Errors
    ///
    /// Fails if an ancestor is missing or the ancestry has a cycle.
    pub fn profile(&self, version_id: &str, profile_id: &str) -> Result<Option<Arc<Profile>>> {
        self.assert_active()?;
        let _read = self.registry.lock().read();
        debug!(version_id, profile_id, "Getting profile");
        GraphResolver::new(self.registry.as_ref(), version_id).resolve(profile_id)
    }

    /// A profile that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] if the profile is missing, and
    /// every error of [`profile`](Self::profile).
    pub fn required_profile(&self, version_id: &str, profile_id: &str) -> Result<Arc<Profile>> {
        self.assert_active()?;
        let _read = self.registry.lock().read();
        self.required_profile_internal(version_id, profile_id)
    }

    fn required_profile_internal(&self, version_id: &str, profile_id: &str) -> Result<Arc<Profile>> {
        GraphResolver::new(self.registry.as_ref(), version_id).resolve_required(profile_id)
    }

    /// Create a profile, creating any missing parents first.
    ///
    /// Parents that already exist are left untouched. If any profile fails
    /// to resolve after it is written, every write of the call is undone.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::AlreadyExists`] if the profile itself exists
    /// - [`ProfileError::CircularInheritance`] if the profile is its own
    ///   ancestor, or if the stored graph would contain a cycle (the write
    ///   is rolled back)
    pub fn create_profile(&self, profile: &Profile) -> Result<Arc<Profile>> {
        self.assert_active()?;
        let _write = self.registry.lock().write();
        info!(version_id = profile.version(), profile_id = profile.id(), "Creating profile");
        ensure_acyclic(profile)?;
        self.write_batch(|batch| {
            self.write_profile_internal(profile, WriteMode::Create, true, batch)
        })
    }

    /// Update a profile, updating existing parents and creating missing ones.
    ///
    /// Failures roll back as for [`create_profile`](Self::create_profile).
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NotFound`] if the profile itself does not exist
    /// - [`ProfileError::CircularInheritance`] as for
    ///   [`create_profile`](Self::create_profile)
    pub fn update_profile(&self, profile: &Profile) -> Result<Arc<Profile>> {
        self.assert_active()?;
        let _write = self.registry.lock().write();
        info!(version_id = profile.version(), profile_id = profile.id(), "Updating profile");
        ensure_acyclic(profile)?;
        self.write_batch(|batch| {
            self.write_profile_internal(profile, WriteMode::Update, true, batch)
        })
    }

    /// Run `write`, undoing everything it wrote if it fails.
    fn write_batch<T>(&self, write: impl FnOnce(&mut WriteBatch) -> Result<T>) -> Result<T> {
        let mut batch = WriteBatch::default();
        match write(&mut batch) {
            Ok(value) => Ok(value),
            Err(err) => {
                if !batch.undo.is_empty() {
                    warn!(writes = batch.undo.len(), error = %err, "Rolling back profile write");
                    self.roll_back(batch.undo)?;
                }
                Err(err)
            }
        }
    }

    fn write_profile_internal(
        &self,
        profile: &Profile,
        mode: WriteMode,
        is_target: bool,
        batch: &mut WriteBatch,
    ) -> Result<Arc<Profile>> {
        if let Some(done) = batch.written.get(profile.id()) {
            return Ok(Arc::clone(done));
        }
        for parent in profile.parents() {
            self.write_profile_internal(parent, mode, false, batch)?;
        }

        let version_id = profile.version();
        let profile_id = profile.id();
        let previous = self.registry.get_profile(version_id, profile_id)?;
        let record = profile.to_record();

        match (mode, &previous, is_target) {
            (WriteMode::Create, Some(_), false) => {
                debug!(version_id, profile_id, "Parent already exists, leaving untouched");
                let existing = self.required_profile_internal(version_id, profile_id)?;
                batch.written.insert(profile_id.to_string(), Arc::clone(&existing));
                return Ok(existing);
            }
            (WriteMode::Create, Some(_), true) => {
                return Err(ProfileError::already_exists(version_id, profile_id).into());
            }
            (WriteMode::Update, None, true) => {
                return Err(ProfileError::not_found(version_id, profile_id).into());
            }
            (WriteMode::Update, Some(_), _) => {
                self.registry.update_profile(&record)?;
            }
            (_, None, _) => {
                self.registry.create_profile(&record)?;
            }
        }
        batch.undo.push((record, previous));

        let stored = self.required_profile_internal(version_id, profile_id)?;
        batch.written.insert(profile_id.to_string(), Arc::clone(&stored));
        Ok(stored)
    }

    /// Undo writes newest first: restore replaced records, delete created ones.
    fn roll_back(&self, undo: Vec<(ProfileRecord, Option<ProfileRecord>)>) -> Result<()> {
        for (record, previous) in undo.into_iter().rev() {
            debug!(version_id = %record.version, profile_id = %record.id, "Undoing profile write");
            let ctx = error_context!(
                "roll back profile write",
                "version" => record.version.as_str(),
                "profile" => record.id.as_str(),
            );
            let restored = match previous {
                Some(previous) => self.registry.update_profile(&previous).map(|_| ()),
                None => self.registry.delete_profile(&record.version, &record.id),
            };
            restored.context(ctx)?;
        }
        Ok(())
    }

    /// The overlay of `profile`, computed with the configured environment.
    ///
    /// An overlay is returned unchanged.
    pub fn overlay_profile(&self, profile: &Profile) -> Result<Profile> {
        self.assert_active()?;
        let builder = OverlayBuilder::for_environment(self.config.environment.as_deref());
        Ok(builder.build(profile)?)
    }

    /// Resolve a stored profile and compute its overlay.
    ///
    /// # Errors
    ///
    /// As [`required_profile`](Self::required_profile), plus decoding
    /// failures of `.properties` fragments.
    pub fn required_overlay_profile(&self, version_id: &str, profile_id: &str) -> Result<Profile> {
        let profile = self.required_profile(version_id, profile_id)?;
        self.overlay_profile(&profile)
    }

    /// Delete a profile.
    ///
    /// A profile assigned to containers is only deleted with `force`, which
    /// unassigns it first. Afterwards the profile's entry is dropped from the
    /// fleet requirements, which are saved if that changed them.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NotFound`] if the profile does not exist
    /// - [`ProfileError::AssignedToContainers`] if containers use it and
    ///   `force` is not set
    /// - [`FabricError::Persistence`] if unassigning or saving the
    ///   requirements fails
    pub fn delete_profile(
        &self,
        fleet: &dyn FleetService,
        version_id: &str,
        profile_id: &str,
        force: bool,
    ) -> Result<()> {
        self.assert_active()?;
        let _write = self.registry.lock().write();

        if !self.registry.has_profile(version_id, profile_id)? {
            return Err(ProfileError::not_found(version_id, profile_id).into());
        }
        info!(version_id, profile_id, force, "Deleting profile");

        let containers = fleet.associated_containers(version_id, profile_id);
        if !containers.is_empty() {
            let ids: Vec<String> = containers.iter().map(|c| c.id().to_string()).collect();
            if !force {
                return Err(ProfileError::AssignedToContainers {
                    profile: profile_id.to_string(),
                    containers: ids,
                }
                .into());
            }
            warn!(profile_id, containers = ?ids, "Force removing profile from containers");
            for container in &containers {
                container.remove_profiles(&[profile_id]).map_err(|e| {
                    FabricError::persistence(
                        format!(
                            "Failed to remove profile {profile_id} from container {}",
                            container.id()
                        ),
                        e,
                    )
                })?;
            }
        }

        self.registry.delete_profile(version_id, profile_id)?;

        let mut requirements = fleet.requirements();
        if requirements.remove_profile_requirements(profile_id) {
            fleet.set_requirements(requirements).map_err(|e| {
                FabricError::persistence(
                    format!("Failed to update requirements after deleting profile {profile_id}"),
                    e,
                )
            })?;
            debug!(profile_id, "Removed profile requirements");
        }
        Ok(())
    }
}

/// Reject a profile graph in which some profile is its own ancestor.
fn ensure_acyclic(profile: &Profile) -> Result<()> {
    fn walk<'a>(
        profile: &'a Profile,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if let Some(start) = path.iter().position(|id| *id == profile.id()) {
            let mut chain: Vec<&str> = path.get(start..).unwrap_or_default().to_vec();
            chain.push(profile.id());
            return Err(ProfileError::circular_inheritance(chain.join(" -> ")).into());
        }
        if done.contains(profile.id()) {
            return Ok(());
        }
        path.push(profile.id());
        for parent in profile.parents() {
            walk(parent, path, done)?;
        }
        path.pop();
        done.insert(profile.id());
        Ok(())
    }

    walk(profile, &mut Vec::new(), &mut HashSet::new())
}
