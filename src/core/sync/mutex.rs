/*!
 * Exclusive-Lock Counter
 * Blocking mutual exclusion via parking_lot::Mutex
 */

use super::traits::CounterOps;
use crate::monitoring::record_busy_teardown;
use parking_lot::Mutex;

/// Counter guarded by a blocking mutex
///
/// Waiters park instead of spinning. Each operation holds the lock for one
/// read-modify-write and never re-enters the counter, so it cannot deadlock.
pub struct MutexCounter {
    value: Mutex<i64>,
}

impl MutexCounter {
    pub fn new(initial: i64) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

impl CounterOps for MutexCounter {
    #[inline]
    fn increment(&self) -> i64 {
        let mut guard = self.value.lock();
        *guard = guard.wrapping_add(1);
        *guard
    }

    #[inline]
    fn get(&self) -> i64 {
        *self.value.lock()
    }

    fn name(&self) -> &'static str {
        "exclusive-lock"
    }
}

impl Drop for MutexCounter {
    fn drop(&mut self) {
        if self.value.is_locked() {
            record_busy_teardown(self.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::busy_teardowns;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_increment_returns_new_value() {
        let counter = MutexCounter::new(0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_wraps_at_max() {
        let counter = MutexCounter::new(i64::MAX);
        assert_eq!(counter.increment(), i64::MIN);
    }

    #[test]
    fn test_concurrent_mutex() {
        let counter = Arc::new(MutexCounter::new(0));
        let mut handles = vec![];

        for _ in 0..16 {
            let counter = counter.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    counter.increment();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.get(), 16_000);
    }

    #[test]
    fn test_busy_teardown_recorded() {
        let counter = MutexCounter::new(0);
        std::mem::forget(counter.value.lock());

        let before = busy_teardowns();
        drop(counter);
        assert!(busy_teardowns() > before);
    }
}
