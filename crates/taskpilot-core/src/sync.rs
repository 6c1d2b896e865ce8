//! Lock helpers shared by test doubles and providers.

use std::sync::{Mutex, MutexGuard};

/// Extension trait for `Mutex` that recovers from poisoning.
///
/// A poisoned lock only means another thread panicked while holding it; the
/// panic itself is the failure worth reporting, so callers keep going with the
/// inner value.
pub trait IgnoreLock<T> {
    /// Lock the mutex, clearing any poison.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnoreLock<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
