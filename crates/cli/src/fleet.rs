//! Fleet backed by a requirements file next to the registry

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fabric_profile_service::{Container, FleetRequirements, FleetService};
use tracing::{debug, warn};

/// File holding the fleet requirements, relative to the registry root.
pub const REQUIREMENTS_FILE: &str = "requirements.json";

/// A fleet with no running containers whose requirements live in
/// `<root>/requirements.json`.
pub struct LocalFleet {
    path: PathBuf,
}

impl LocalFleet {
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join(REQUIREMENTS_FILE),
        }
    }
}

impl FleetService for LocalFleet {
    fn associated_containers(&self, _version_id: &str, _profile_id: &str) -> Vec<Arc<dyn Container>> {
        Vec::new()
    }

    fn requirements(&self) -> FleetRequirements {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return FleetRequirements::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read requirements");
                return FleetRequirements::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring malformed requirements");
            FleetRequirements::default()
        })
    }

    fn set_requirements(&self, requirements: FleetRequirements) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(&requirements)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Saved requirements");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fabric_profile_service::ProfileRequirements;

    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_missing_file_means_no_requirements() -> TestResult {
        let dir = tempfile::tempdir()?;
        let fleet = LocalFleet::new(dir.path());
        assert!(fleet.requirements().is_empty());
        assert!(fleet.associated_containers("1.0", "p").is_empty());
        Ok(())
    }

    #[test]
    fn test_requirements_survive_save() -> TestResult {
        let dir = tempfile::tempdir()?;
        let fleet = LocalFleet::new(dir.path());

        let mut requirements = FleetRequirements::default();
        requirements.add_or_update_profile_requirements(
            ProfileRequirements::new("web").with_minimum_instances(2),
        );
        fleet.set_requirements(requirements.clone())?;

        assert_eq!(fleet.requirements(), requirements);
        assert!(dir.path().join(REQUIREMENTS_FILE).exists());
        Ok(())
    }
}
