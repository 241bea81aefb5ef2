//! Scoped bus lock
//!
//! `BusLock::try_acquire` either hands out a `BusGuard` or reports that the
//! lock is already held. The guard releases the lock when it is dropped,
//! which covers normal returns, `?` early exits and unwinding alike.

use core::cell::Cell;

/// Non-blocking exclusive lock for one physical bus
#[derive(Debug, Default)]
pub struct BusLock {
    held: Cell<bool>,
}

impl BusLock {
    /// Create a free lock
    pub const fn new() -> Self {
        Self {
            held: Cell::new(false),
        }
    }

    /// Try to take the lock without blocking
    ///
    /// Returns `None` if the lock is already held.
    pub fn try_acquire(&self) -> Option<BusGuard<'_>> {
        if self.held.replace(true) {
            return None;
        }
        Some(BusGuard { lock: self })
    }

    /// Whether someone currently holds the lock
    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

/// Proof that a `BusLock` is held; releases it on drop
#[derive(Debug)]
pub struct BusGuard<'a> {
    lock: &'a BusLock,
}

impl BusGuard<'_> {
    /// Whether this guard holds `lock`
    pub fn guards(&self, lock: &BusLock) -> bool {
        core::ptr::eq(self.lock, lock)
    }

    /// Release the lock explicitly
    pub fn release(self) {}
}

impl Drop for BusGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let lock = BusLock::new();
        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.try_acquire().is_none());
        drop(guard);
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_early_exit() {
        fn failing(lock: &BusLock) -> Result<(), ()> {
            let _guard = lock.try_acquire().ok_or(())?;
            Err(())
        }

        let lock = BusLock::new();
        assert!(failing(&lock).is_err());
        assert!(!lock.is_held());
    }

    #[test]
    fn test_guard_identity() {
        let a = BusLock::new();
        let b = BusLock::new();
        let guard = a.try_acquire().unwrap();
        assert!(guard.guards(&a));
        assert!(!guard.guards(&b));
        guard.release();
        assert!(!a.is_held());
    }
}
