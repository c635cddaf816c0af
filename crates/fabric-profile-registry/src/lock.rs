//! Coarse reader/writer lock shared by every user of a registry

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Registry-wide reader/writer lock.
///
/// The lock guards sequences of registry calls, not the registry's own data
/// (backends protect that themselves). It is not re-entrant: a thread that
/// holds a handle must not ask for another one.
#[derive(Debug, Default)]
pub struct RegistryLock {
    inner: RwLock<()>,
}

impl RegistryLock {
    /// Create an unlocked lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire shared access, blocking while a writer holds the lock.
    pub fn read(&self) -> ReadLockHandle<'_> {
        ReadLockHandle {
            guard: self.inner.read(),
        }
    }

    /// Acquire exclusive access, blocking while any handle is held.
    pub fn write(&self) -> WriteLockHandle<'_> {
        WriteLockHandle {
            guard: self.inner.write(),
        }
    }

    /// Whether any handle is currently held.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Whether a write handle is currently held.
    pub fn is_write_locked(&self) -> bool {
        self.inner.is_locked_exclusive()
    }
}

/// Shared access to a registry. Released on drop or by [`unlock`](Self::unlock).
#[must_use = "the read lock is released as soon as the handle is dropped"]
#[derive(Debug)]
pub struct ReadLockHandle<'a> {
    guard: RwLockReadGuard<'a, ()>,
}

impl ReadLockHandle<'_> {
    /// Release the lock now.
    pub fn unlock(self) {
        drop(self.guard);
    }
}

/// Exclusive access to a registry. Released on drop or by [`unlock`](Self::unlock).
#[must_use = "the write lock is released as soon as the handle is dropped"]
#[derive(Debug)]
pub struct WriteLockHandle<'a> {
    guard: RwLockWriteGuard<'a, ()>,
}

impl WriteLockHandle<'_> {
    /// Release the lock now.
    pub fn unlock(self) {
        drop(self.guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readers_share() {
        let lock = RegistryLock::new();
        let a = lock.read();
        let b = lock.read();
        assert!(lock.is_locked());
        assert!(!lock.is_write_locked());
        a.unlock();
        b.unlock();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_write_handle_released_on_drop() {
        let lock = RegistryLock::new();
        {
            let _guard = lock.write();
            assert!(lock.is_write_locked());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_explicit_unlock_releases_writer() {
        let lock = RegistryLock::new();
        let guard = lock.write();
        guard.unlock();
        let _reader = lock.read();
        assert!(!lock.is_write_locked());
    }

    #[test]
    fn test_writer_waits_for_reader() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let lock = Arc::new(RegistryLock::new());
        let wrote = Arc::new(AtomicBool::new(false));
        let reader = lock.read();

        let handle = {
            let lock = Arc::clone(&lock);
            let wrote = Arc::clone(&wrote);
            std::thread::spawn(move || {
                let _writer = lock.write();
                wrote.store(true, Ordering::SeqCst);
            })
        };

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(!wrote.load(Ordering::SeqCst));
        reader.unlock();

        assert!(handle.join().is_ok());
        assert!(wrote.load(Ordering::SeqCst));
    }
}
