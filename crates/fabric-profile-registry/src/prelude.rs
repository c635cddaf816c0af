//! Prelude for convenient imports

pub use crate::file::FileProfileRegistry;
pub use crate::lock::{ReadLockHandle, RegistryLock, WriteLockHandle};
pub use crate::memory::InMemoryProfileRegistry;
pub use crate::registry::ProfileRegistry;
