//! Prelude for convenient imports

pub use crate::config::ProfileServiceConfig;
pub use crate::fingerprint::fingerprint;
pub use crate::fleet::{Container, FleetRequirements, FleetService, ProfileRequirements};
pub use crate::overlay::{OverlayBuilder, inherited_profiles};
pub use crate::resolver::GraphResolver;
pub use crate::service::ProfileService;
pub use fabric_profile::{Profile, ProfileBuilder, Version, VersionBuilder};
pub use fabric_profile_registry::{FileProfileRegistry, InMemoryProfileRegistry, ProfileRegistry};
