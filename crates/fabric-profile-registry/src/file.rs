//! Directory-backed registry
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<version>/version.json                     version attributes
//! <root>/<version>/profiles/<id>.profile/profile.json   profile attributes
//! <root>/<version>/profiles/<id>.profile/<file>         file configurations
//! ```
//!
//! Every file is written to a hidden temporary sibling first and then renamed
//! into place, so readers never observe a partially written file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use fabric_errors::{ProfileError, Result, StoreError};
use fabric_profile::{ProfileRecord, validate_profile_id, validate_version_id};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::lock::RegistryLock;
use crate::registry::ProfileRegistry;

const VERSION_FILE: &str = "version.json";
const PROFILE_FILE: &str = "profile.json";
const PROFILES_DIR: &str = "profiles";
const PROFILE_DIR_SUFFIX: &str = ".profile";
const TEMP_SUFFIX: &str = ".tmp";

/// Registry that stores versions and profiles as directories on disk.
#[derive(Debug)]
pub struct FileProfileRegistry {
    root: PathBuf,
    lock: RegistryLock,
    io: Mutex<()>,
}

impl FileProfileRegistry {
    /// Open a registry rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a store error if the root directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        debug!(root = %root.display(), "Opened profile registry");
        Ok(Self {
            root,
            lock: RegistryLock::new(),
            io: Mutex::new(()),
        })
    }

    /// Root directory of the registry.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, version_id: &str) -> PathBuf {
        self.root.join(version_id)
    }

    fn profiles_dir(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join(PROFILES_DIR)
    }

    fn profile_dir(&self, version_id: &str, profile_id: &str) -> PathBuf {
        self.profiles_dir(version_id)
            .join(format!("{profile_id}{PROFILE_DIR_SUFFIX}"))
    }

    fn version_exists(&self, version_id: &str) -> bool {
        validate_version_id(version_id).is_ok()
            && self.version_dir(version_id).join(VERSION_FILE).is_file()
    }

    fn profile_exists(&self, version_id: &str, profile_id: &str) -> bool {
        validate_version_id(version_id).is_ok()
            && validate_profile_id(profile_id).is_ok()
            && self
                .profile_dir(version_id, profile_id)
                .join(PROFILE_FILE)
                .is_file()
    }

    fn read_attributes(path: &Path) -> Result<BTreeMap<String, String>> {
        let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
        let attributes = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::serialization(path.display().to_string(), e))?;
        Ok(attributes)
    }

    fn write_attributes(path: &Path, attributes: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_vec_pretty(attributes)
            .map_err(|e| StoreError::serialization(path.display().to_string(), e))?;
        write_atomic(path, &json)
    }

    fn read_record(&self, version_id: &str, profile_id: &str) -> Result<ProfileRecord> {
        let dir = self.profile_dir(version_id, profile_id);
        let mut record = ProfileRecord::new(version_id, profile_id);
        record.attributes = Self::read_attributes(&dir.join(PROFILE_FILE))?;

        for (name, path) in list_dir(&dir)? {
            if name == PROFILE_FILE || !path.is_file() {
                continue;
            }
            let content = fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
            record.file_configurations.insert(name, content);
        }
        Ok(record)
    }

    fn write_record(&self, record: &ProfileRecord) -> Result<()> {
        for name in record.file_configurations.keys() {
            validate_file_name(name)?;
        }

        let dir = self.profile_dir(&record.version, &record.id);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        for (name, path) in list_dir(&dir)? {
            if name != PROFILE_FILE
                && path.is_file()
                && !record.file_configurations.contains_key(&name)
            {
                fs::remove_file(&path).map_err(|e| StoreError::io(&path, e))?;
                trace!(file = %name, "Removed stale file configuration");
            }
        }

        for (name, content) in &record.file_configurations {
            write_atomic(&dir.join(name), content)?;
        }
        Self::write_attributes(&dir.join(PROFILE_FILE), &record.attributes)
    }

    fn copy_version(
        &self,
        parent_id: &str,
        version_id: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut merged = Self::read_attributes(&self.version_dir(parent_id).join(VERSION_FILE))?;
        merged.extend(attributes.clone());

        let profiles_dir = self.profiles_dir(version_id);
        fs::create_dir_all(&profiles_dir).map_err(|e| StoreError::io(&profiles_dir, e))?;

        for profile_id in self.list_profiles(parent_id)? {
            let mut record = self.read_record(parent_id, &profile_id)?;
            record.version = version_id.to_string();
            self.write_record(&record)?;
        }

        // version.json last: the version only becomes visible once complete
        Self::write_attributes(&self.version_dir(version_id).join(VERSION_FILE), &merged)
    }

    fn list_profiles(&self, version_id: &str) -> Result<Vec<String>> {
        let dir = self.profiles_dir(version_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<String> = list_dir(&dir)?
            .into_iter()
            .filter_map(|(name, path)| {
                let id = name.strip_suffix(PROFILE_DIR_SUFFIX)?;
                path.join(PROFILE_FILE).is_file().then(|| id.to_string())
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl ProfileRegistry for FileProfileRegistry {
    fn lock(&self) -> &RegistryLock {
        &self.lock
    }

    fn versions(&self) -> Result<Vec<String>> {
        let _io = self.io.lock();
        let mut ids: Vec<String> = list_dir(&self.root)?
            .into_iter()
            .filter(|(name, path)| {
                validate_version_id(name).is_ok() && path.join(VERSION_FILE).is_file()
            })
            .map(|(name, _)| name)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn has_version(&self, version_id: &str) -> Result<bool> {
        let _io = self.io.lock();
        Ok(self.version_exists(version_id))
    }

    fn version_attributes(&self, version_id: &str) -> Result<BTreeMap<String, String>> {
        let _io = self.io.lock();
        if !self.version_exists(version_id) {
            return Err(ProfileError::version_not_found(version_id).into());
        }
        Self::read_attributes(&self.version_dir(version_id).join(VERSION_FILE))
    }

    fn create_version(&self, version_id: &str) -> Result<()> {
        validate_version_id(version_id)?;
        let _io = self.io.lock();
        if self.version_exists(version_id) {
            return Err(ProfileError::VersionAlreadyExists(version_id.to_string()).into());
        }
        let profiles_dir = self.profiles_dir(version_id);
        fs::create_dir_all(&profiles_dir).map_err(|e| StoreError::io(&profiles_dir, e))?;
        Self::write_attributes(
            &self.version_dir(version_id).join(VERSION_FILE),
            &BTreeMap::new(),
        )?;
        debug!(version_id, "Created version directory");
        Ok(())
    }

    fn create_version_from(
        &self,
        parent_id: &str,
        version_id: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        validate_version_id(version_id)?;
        let _io = self.io.lock();
        if self.version_exists(version_id) {
            return Err(ProfileError::VersionAlreadyExists(version_id.to_string()).into());
        }
        if !self.version_exists(parent_id) {
            return Err(ProfileError::version_not_found(parent_id).into());
        }

        if let Err(e) = self.copy_version(parent_id, version_id, attributes) {
            let dir = self.version_dir(version_id);
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                debug!(path = %dir.display(), error = %cleanup, "Failed to clean up partial version");
            }
            return Err(e);
        }
        debug!(parent_id, version_id, "Cloned version directory");
        Ok(())
    }

    fn set_version_attribute(
        &self,
        version_id: &str,
        key: &str,
        value: Option<&str>,
    ) -> Result<()> {
        let _io = self.io.lock();
        if !self.version_exists(version_id) {
            return Err(ProfileError::version_not_found(version_id).into());
        }
        let path = self.version_dir(version_id).join(VERSION_FILE);
        let mut attributes = Self::read_attributes(&path)?;
        match value {
            Some(value) => attributes.insert(key.to_string(), value.to_string()),
            None => attributes.remove(key),
        };
        Self::write_attributes(&path, &attributes)
    }

    fn delete_version(&self, version_id: &str) -> Result<()> {
        let _io = self.io.lock();
        if !self.version_exists(version_id) {
            return Err(ProfileError::version_not_found(version_id).into());
        }
        let dir = self.version_dir(version_id);
        fs::remove_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        debug!(version_id, "Deleted version directory");
        Ok(())
    }

    fn profiles(&self, version_id: &str) -> Result<Vec<String>> {
        let _io = self.io.lock();
        if !self.version_exists(version_id) {
            return Err(ProfileError::version_not_found(version_id).into());
        }
        self.list_profiles(version_id)
    }

    fn has_profile(&self, version_id: &str, profile_id: &str) -> Result<bool> {
        let _io = self.io.lock();
        Ok(self.profile_exists(version_id, profile_id))
    }

    fn get_profile(&self, version_id: &str, profile_id: &str) -> Result<Option<ProfileRecord>> {
        let _io = self.io.lock();
        if !self.profile_exists(version_id, profile_id) {
            return Ok(None);
        }
        self.read_record(version_id, profile_id).map(Some)
    }

    fn create_profile(&self, record: &ProfileRecord) -> Result<String> {
        validate_profile_id(&record.id)?;
        let _io = self.io.lock();
        if !self.version_exists(&record.version) {
            return Err(ProfileError::version_not_found(&record.version).into());
        }
        if self.profile_exists(&record.version, &record.id) {
            return Err(ProfileError::already_exists(&record.version, &record.id).into());
        }
        self.write_record(record)?;
        debug!(version_id = %record.version, profile_id = %record.id, "Wrote new profile");
        Ok(record.id.clone())
    }

    fn update_profile(&self, record: &ProfileRecord) -> Result<String> {
        let _io = self.io.lock();
        if !self.profile_exists(&record.version, &record.id) {
            return Err(ProfileError::not_found(&record.version, &record.id).into());
        }
        self.write_record(record)?;
        debug!(version_id = %record.version, profile_id = %record.id, "Rewrote profile");
        Ok(record.id.clone())
    }

    fn delete_profile(&self, version_id: &str, profile_id: &str) -> Result<()> {
        let _io = self.io.lock();
        if !self.profile_exists(version_id, profile_id) {
            return Err(ProfileError::not_found(version_id, profile_id).into());
        }
        let dir = self.profile_dir(version_id, profile_id);
        fs::remove_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        debug!(version_id, profile_id, "Deleted profile directory");
        Ok(())
    }
}

/// Write `content` to a hidden temporary sibling of `path`, then rename it
/// over `path`.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::Backend(format!("invalid target path {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{file_name}{TEMP_SUFFIX}"));

    fs::write(&temp_path, content).map_err(|e| StoreError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e))?;
    trace!(path = %path.display(), bytes = content.len(), "File written atomically");
    Ok(())
}

/// Visible entries of a directory as `(name, path)`, skipping hidden files
/// and names that are not UTF-8.
fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        out.push((name, entry.path()));
    }
    Ok(out)
}

fn validate_file_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("file name cannot be empty")
    } else if name.starts_with('.') {
        Some("file name cannot start with '.'")
    } else if name.contains(['/', '\\', '\0']) {
        Some("file name cannot contain path separators")
    } else if name == PROFILE_FILE {
        Some("file name is reserved for profile attributes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ProfileError::invalid_format(name, reason).into()),
        None => Ok(()),
    }
}
