//! Service configuration

use std::path::Path;

use fabric_errors::{FabricError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable naming the active environment.
pub const ENVIRONMENT_VAR: &str = "FABRIC_ENVIRONMENT";

/// Profile service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileServiceConfig {
    /// Name used in lifecycle errors and logs
    pub service_name: String,
    /// Active environment; selects `<file>#<environment>` variants in overlays
    pub environment: Option<String>,
}

impl Default for ProfileServiceConfig {
    fn default() -> Self {
        Self {
            service_name: "profile-service".to_string(),
            environment: None,
        }
    }
}

impl ProfileServiceConfig {
    /// Create a configuration with the given environment.
    pub fn new(environment: Option<String>) -> Self {
        Self {
            environment,
            ..Default::default()
        }
    }

    /// Set the active environment.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set the service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Default configuration with the environment taken from
    /// `FABRIC_ENVIRONMENT`. An empty value counts as unset.
    pub fn from_env() -> Self {
        Self::new(environment_from(std::env::var(ENVIRONMENT_VAR).ok()))
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read, parsed or
    /// fails [`validate`](Self::validate).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FabricError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            FabricError::config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded profile service config");
        Ok(config)
    }

    /// Save configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be written.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FabricError::config(format!("Failed to create config directory: {e}"))
            })?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FabricError::config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content).map_err(|e| {
            FabricError::config(format!("Failed to write config file {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Saved profile service config");
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service name is empty or the
    /// environment is empty or contains `#` or whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(FabricError::config("service name cannot be empty"));
        }
        if let Some(env) = &self.environment
            && (env.is_empty() || env.contains('#') || env.chars().any(char::is_whitespace))
        {
            return Err(FabricError::config(format!("invalid environment name {env:?}")));
        }
        Ok(())
    }
}

fn environment_from(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
