//! Profile overlay resolution and the version/profile service
//!
//! The pieces, in the order a request flows through them:
//!
//! - [`resolver`]: turns stored records into a graph of [`Profile`] nodes,
//!   memoizing shared ancestors and rejecting cycles
//! - [`overlay`]: flattens a profile and its ancestors into one overlay
//!   profile, merging `.properties` files key by key
//! - [`fingerprint`]: stamps an overlay with a change-detecting identity
//! - [`service`]: the [`ProfileService`] facade tying them to a
//!   [`ProfileRegistry`] under the registry lock
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fabric_profile::ProfileBuilder;
//! use fabric_profile_registry::InMemoryProfileRegistry;
//! use fabric_profile_service::{ProfileService, ProfileServiceConfig};
//!
//! # fn main() -> fabric_errors::Result<()> {
//! let service = ProfileService::new(
//!     Arc::new(InMemoryProfileRegistry::new()),
//!     ProfileServiceConfig::default(),
//! );
//! service.start();
//! service.create_version(&fabric_profile::VersionBuilder::new("1.0").build()?)?;
//!
//! let base = Arc::new(
//!     ProfileBuilder::new("1.0", "base")
//!         .with_file("app.properties", b"a=1\nb=5\n".to_vec())
//!         .build()?,
//! );
//! let child = ProfileBuilder::new("1.0", "child")
//!     .with_parent(base)
//!     .with_file("app.properties", b"a=2\nb=#deleted#\n".to_vec())
//!     .build()?;
//! service.create_profile(&child)?;
//!
//! let overlay = service.required_overlay_profile("1.0", "child")?;
//! let app = overlay.configuration("app").cloned().unwrap_or_default();
//! assert_eq!(app.get("a").map(String::as_str), Some("2"));
//! assert!(!app.contains_key("b"));
//! # Ok(())
//! # }
//! ```
//!
//! [`Profile`]: fabric_profile::Profile
//! [`ProfileRegistry`]: fabric_profile_registry::ProfileRegistry

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod fingerprint;
pub mod fleet;
pub mod overlay;
pub mod prelude;
pub mod resolver;
pub mod service;

pub use config::ProfileServiceConfig;
pub use fingerprint::fingerprint;
pub use fleet::{Container, FleetRequirements, FleetService, ProfileRequirements};
pub use overlay::{OverlayBuilder, inherited_profiles};
pub use resolver::GraphResolver;
pub use service::ProfileService;
