//! Shared fixtures for service integration tests

use std::io;
use std::sync::Arc;

use fabric_profile::{Profile, ProfileBuilder, VersionBuilder};
use fabric_profile_registry::InMemoryProfileRegistry;
use fabric_profile_service::prelude::*;
use parking_lot::Mutex;

pub fn must<T, E: std::fmt::Debug>(r: Result<T, E>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => panic!("unexpected Err: {e:?}"),
    }
}

pub fn service_with(config: ProfileServiceConfig) -> ProfileService {
    let service = ProfileService::new(Arc::new(InMemoryProfileRegistry::new()), config);
    service.start();
    must(service.create_version(&must(VersionBuilder::new("1.0").build())));
    service
}

pub fn service() -> ProfileService {
    service_with(ProfileServiceConfig::default())
}

pub fn profile(id: &str, parents: &[&Arc<Profile>], files: &[(&str, &str)]) -> Arc<Profile> {
    let mut builder = ProfileBuilder::new("1.0", id);
    for parent in parents {
        builder = builder.with_parent(Arc::clone(parent));
    }
    for (name, content) in files {
        builder = builder.with_file(*name, content.as_bytes().to_vec());
    }
    Arc::new(must(builder.build()))
}

pub struct TestContainer {
    id: String,
    pub removed: Mutex<Vec<String>>,
    fail: bool,
}

impl TestContainer {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            removed: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            removed: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

impl Container for TestContainer {
    fn id(&self) -> &str {
        &self.id
    }

    fn remove_profiles(&self, profile_ids: &[&str]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::other("container unreachable"));
        }
        self.removed
            .lock()
            .extend(profile_ids.iter().map(|id| (*id).to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct TestFleet {
    pub containers: Vec<Arc<TestContainer>>,
    pub requirements: Mutex<FleetRequirements>,
    pub saves: Mutex<usize>,
    pub fail_saves: bool,
}

impl FleetService for TestFleet {
    fn associated_containers(&self, _version_id: &str, _profile_id: &str) -> Vec<Arc<dyn Container>> {
        self.containers
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn Container>)
            .collect()
    }

    fn requirements(&self) -> FleetRequirements {
        self.requirements.lock().clone()
    }

    fn set_requirements(&self, requirements: FleetRequirements) -> io::Result<()> {
        if self.fail_saves {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        *self.requirements.lock() = requirements;
        *self.saves.lock() += 1;
        Ok(())
    }
}
