//! Profile store interface and reference backends
//!
//! The profile service never talks to storage directly. It goes through the
//! [`ProfileRegistry`] trait, which stores [`fabric_profile::ProfileRecord`]s
//! grouped by version and exposes a coarse reader/writer [`RegistryLock`]
//! that callers hold around multi-step operations.
//!
//! Two backends are provided:
//!
//! - [`InMemoryProfileRegistry`]: everything in process memory
//! - [`FileProfileRegistry`]: one directory per version, one directory per
//!   profile, atomic file writes
//!
//! # Example
//!
//! ```
//! use fabric_profile::ProfileRecord;
//! use fabric_profile_registry::prelude::*;
//!
//! # fn main() -> fabric_errors::Result<()> {
//! let registry = InMemoryProfileRegistry::new();
//! registry.create_version("1.0")?;
//! registry.create_profile(&ProfileRecord::new("1.0", "base"))?;
//!
//! let _guard = registry.lock().read();
//! assert!(registry.has_profile("1.0", "base")?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod file;
pub mod lock;
pub mod memory;
pub mod prelude;
pub mod registry;

pub use file::FileProfileRegistry;
pub use lock::{ReadLockHandle, RegistryLock, WriteLockHandle};
pub use memory::InMemoryProfileRegistry;
pub use registry::ProfileRegistry;
