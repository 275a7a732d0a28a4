/*!
 * Spin Lock with Bounded Backoff
 *
 * Busy-wait mutual exclusion for critical sections shorter than a thread
 * reschedule. Waiters never park; they burn CPU until the holder releases.
 *
 * # Design: Test-and-Test-and-Set with Three-Phase Backoff
 *
 * A failed acquire polls the flag with plain loads (no cache-line
 * ownership transfer) and backs off:
 *
 * 1. **Spin phase** (`0..spin_limit` polls): `spin_loop()` hint only
 * 2. **Mixed phase** (`spin_limit..yield_limit`): alternate hint and `yield_now()`
 * 3. **Yield phase** (`yield_limit..`): `yield_now()` every poll
 *
 * The yield phase lets a descheduled holder run again when threads
 * outnumber cores.
 */

use super::config::SpinConfig;
use super::traits::CounterOps;
use crate::core::limits::{DEFAULT_SPIN_LIMIT, DEFAULT_YIELD_LIMIT};
use crate::monitoring::record_busy_teardown;
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Busy-wait lock protecting a value of type `T`
pub struct SpinLock<T> {
    locked: AtomicBool,
    config: SpinConfig,
    value: UnsafeCell<T>,
}

// SAFETY: access to `value` is serialized by `locked`; the guard hands out
// `&mut T` to one thread at a time, so only `T: Send` is required.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Create an unlocked spin lock with default backoff
    pub const fn new(value: T) -> Self {
        Self::with_config(
            value,
            SpinConfig {
                spin_limit: DEFAULT_SPIN_LIMIT,
                yield_limit: DEFAULT_YIELD_LIMIT,
            },
        )
    }

    /// Create an unlocked spin lock with explicit backoff limits
    pub const fn with_config(value: T, config: SpinConfig) -> Self {
        Self {
            locked: AtomicBool::new(false),
            config,
            value: UnsafeCell::new(value),
        }
    }

    /// Acquire the lock, spinning until it is free
    ///
    /// The lock is released when the returned guard drops, including during
    /// unwinding.
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_, T> {
        if let Some(guard) = self.try_lock() {
            return guard;
        }
        self.lock_contended()
    }

    #[cold]
    fn lock_contended(&self) -> SpinGuard<'_, T> {
        let mut polls = 0u32;
        loop {
            while self.locked.load(Ordering::Relaxed) {
                self.backoff(polls);
                polls = polls.saturating_add(1);
            }
            if let Some(guard) = self.try_lock() {
                return guard;
            }
        }
    }

    #[inline]
    fn backoff(&self, polls: u32) {
        if polls < self.config.spin_limit {
            std::hint::spin_loop();
        } else if polls < self.config.yield_limit {
            if polls % 2 == 0 {
                thread::yield_now();
            } else {
                std::hint::spin_loop();
            }
        } else {
            thread::yield_now();
        }
    }

    /// Try to acquire the lock without waiting
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_, T>> {
        self.locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| SpinGuard {
                lock: self,
                _marker: PhantomData,
            })
    }

    /// Check whether some guard currently holds the lock (for diagnostics)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Backoff limits in use
    pub fn config(&self) -> SpinConfig {
        self.config
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// RAII guard; releases the spin lock on drop
pub struct SpinGuard<'a, T> {
    lock: &'a SpinLock<T>,
    // Sync only when T: Sync, like a `&mut T`
    _marker: PhantomData<&'a mut T>,
}

impl<T> Deref for SpinGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the guard exists only while `locked` is held by us
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SpinGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard exists only while `locked` is held by us
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for SpinGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

/// Counter guarded by a `SpinLock`
///
/// Appropriate only when waits are shorter than a reschedule; under
/// oversubscription every waiter burns a core (or its timeslice) polling.
pub struct SpinCounter {
    cell: SpinLock<i64>,
}

impl SpinCounter {
    pub fn new(initial: i64, config: SpinConfig) -> Self {
        Self {
            cell: SpinLock::with_config(initial, config),
        }
    }
}

impl CounterOps for SpinCounter {
    #[inline]
    fn increment(&self) -> i64 {
        let mut value = self.cell.lock();
        *value = value.wrapping_add(1);
        *value
    }

    #[inline]
    fn get(&self) -> i64 {
        *self.cell.lock()
    }

    fn name(&self) -> &'static str {
        "spin-lock"
    }
}

impl Drop for SpinCounter {
    fn drop(&mut self) {
        if self.cell.is_locked() {
            record_busy_teardown(self.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::busy_teardowns;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    #[test]
    fn test_lock_and_release() {
        let lock = SpinLock::new(5u32);
        {
            let mut guard = lock.lock();
            *guard += 1;
            assert!(lock.is_locked());
            assert!(lock.try_lock().is_none());
        }
        assert!(!lock.is_locked());
        assert_eq!(*lock.lock(), 6);
    }

    #[test]
    fn test_released_on_panic() {
        let lock = SpinLock::new(0i64);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut guard = lock.lock();
            *guard = 1;
            panic!("critical section failed");
        }));

        assert!(result.is_err());
        assert!(!lock.is_locked());
        assert_eq!(*lock.lock(), 1);
    }

    #[test]
    fn test_contended_increments() {
        let lock = Arc::new(SpinLock::with_config(
            0u64,
            SpinConfig {
                spin_limit: 1,
                yield_limit: 1,
            },
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        *lock.lock() += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*lock.lock(), 8000);
        assert_eq!(lock.config().yield_limit, 1);
    }

    #[test]
    fn test_spin_counter_returns_new_value() {
        let counter = SpinCounter::new(41, SpinConfig::default());
        assert_eq!(counter.increment(), 42);
        assert_eq!(counter.get(), 42);
        assert_eq!(counter.name(), "spin-lock");
    }

    #[test]
    fn test_busy_teardown_recorded() {
        let counter = SpinCounter::new(0, SpinConfig::default());
        std::mem::forget(counter.cell.lock());

        let before = busy_teardowns();
        drop(counter);
        assert!(busy_teardowns() > before);
    }
}
