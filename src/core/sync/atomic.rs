/*!
 * Lock-Free Counter
 *
 * Compare-and-swap retry loop over an `AtomicI64`. Never blocks: a failed
 * CAS means another caller's CAS succeeded, so the system as a whole always
 * makes progress (lock-free, not wait-free).
 */

use super::traits::CounterOps;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Counter updated by a CAS retry loop
pub struct AtomicCounter {
    value: AtomicI64,
    retries: AtomicU64,
}

impl AtomicCounter {
    pub const fn new(initial: i64) -> Self {
        Self {
            value: AtomicI64::new(initial),
            retries: AtomicU64::new(0),
        }
    }

    /// Failed CAS attempts over the counter's lifetime
    ///
    /// Includes spurious failures of `compare_exchange_weak`.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl CounterOps for AtomicCounter {
    #[inline]
    fn increment(&self) -> i64 {
        let mut current = self.value.load(Ordering::Relaxed);
        loop {
            let candidate = current.wrapping_add(1);
            // Release pairs with the Acquire load in `get`
            match self.value.compare_exchange_weak(
                current,
                candidate,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => {
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    current = observed;
                }
            }
        }
    }

    #[inline]
    fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    fn name(&self) -> &'static str {
        "lock-free"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_increment_sequence() {
        let counter = AtomicCounter::new(-2);
        assert_eq!(counter.increment(), -1);
        assert_eq!(counter.increment(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_uncontended_rarely_retries() {
        let counter = AtomicCounter::default();
        for _ in 0..100 {
            counter.increment();
        }
        // Only spurious weak-CAS failures are possible single-threaded
        assert!(counter.retries() < 100);
    }

    #[test]
    fn test_concurrent_atomic() {
        let counter = Arc::new(AtomicCounter::default());
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
    fn test_wraps_at_max() {
        let counter = AtomicCounter::new(i64::MAX);
        assert_eq!(counter.increment(), i64::MIN);
    }
}
