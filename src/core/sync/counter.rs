/*!
 * Synchronized Counter
 *
 * Integer counter with a synchronization strategy chosen at construction.
 *
 * # Design: Enum Dispatch for Zero-Cost Abstraction
 *
 * Instead of `Box<dyn CounterOps>`, the strategy lives in an enum so the
 * hot path is a predictable branch plus an inlined body, with no vtable
 * lookup per increment.
 */

use super::atomic::AtomicCounter;
use super::config::{CounterConfig, SpinConfig, Strategy};
use super::mutex::MutexCounter;
use super::spin::SpinCounter;
use super::traits::CounterOps;
use crate::core::errors::CounterResult;
use std::fmt;
use tracing::debug;

/// Strategy implementation (enum dispatch for zero overhead)
enum CounterImpl {
    ExclusiveLock(MutexCounter),
    SpinLock(SpinCounter),
    LockFree(AtomicCounter),
}

impl CounterImpl {
    #[inline(always)]
    fn increment(&self) -> i64 {
        match self {
            Self::ExclusiveLock(c) => c.increment(),
            Self::SpinLock(c) => c.increment(),
            Self::LockFree(c) => c.increment(),
        }
    }

    #[inline(always)]
    fn get(&self) -> i64 {
        match self {
            Self::ExclusiveLock(c) => c.get(),
            Self::SpinLock(c) => c.get(),
            Self::LockFree(c) => c.get(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::ExclusiveLock(c) => c.name(),
            Self::SpinLock(c) => c.name(),
            Self::LockFree(c) => c.name(),
        }
    }
}

/// Thread-safe monotonic counter
///
/// Every `increment` returns a distinct value; across N increments the
/// returned values are exactly `initial + 1 ..= initial + N`.
///
/// The counter owns its lock or atomic cell and is deliberately neither
/// `Clone` nor `Copy`: a copy would carry its own lock and no longer
/// exclude writers of the counter it came from. Share it by reference
/// (scoped threads) or via `Arc`.
///
/// ```compile_fail
/// use sync_counter::core::sync::{Strategy, SynchronizedCounter};
///
/// let counter = SynchronizedCounter::new(Strategy::ExclusiveLock);
/// let copy = counter.clone();
/// ```
///
/// # Examples
///
/// ```
/// use sync_counter::core::sync::{Strategy, SynchronizedCounter};
/// use std::thread;
///
/// let counter = SynchronizedCounter::new(Strategy::LockFree);
///
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             for _ in 0..100 {
///                 counter.increment();
///             }
///         });
///     }
/// });
///
/// assert_eq!(counter.get(), 400);
/// ```
pub struct SynchronizedCounter {
    inner: CounterImpl,
    strategy: Strategy,
}

impl SynchronizedCounter {
    /// Create a counter starting at zero
    ///
    /// `Strategy::Auto` is resolved for the current platform.
    pub fn new(strategy: Strategy) -> Self {
        Self::with_initial(strategy, 0)
    }

    /// Create a counter starting at `initial`
    pub fn with_initial(strategy: Strategy, initial: i64) -> Self {
        Self::build(strategy.resolve(), initial, SpinConfig::default())
    }

    /// Create a counter from a validated configuration
    ///
    /// No counter is produced if the configuration is rejected.
    pub fn from_config(config: &CounterConfig) -> CounterResult<Self> {
        config.validate()?;
        Ok(Self::build(config.select_strategy(), config.initial, config.spin))
    }

    fn build(strategy: Strategy, initial: i64, spin: SpinConfig) -> Self {
        let inner = match strategy {
            Strategy::ExclusiveLock => CounterImpl::ExclusiveLock(MutexCounter::new(initial)),
            Strategy::SpinLock => CounterImpl::SpinLock(SpinCounter::new(initial, spin)),
            // Callers resolve `Auto` before reaching here
            Strategy::LockFree | Strategy::Auto => {
                CounterImpl::LockFree(AtomicCounter::new(initial))
            }
        };

        debug!(strategy = inner.name(), initial, "Counter constructed");

        Self {
            strategy: strategy.resolve(),
            inner,
        }
    }

    /// Add one and return the new value
    #[inline]
    pub fn increment(&self) -> i64 {
        self.inner.increment()
    }

    /// Read a consistent snapshot of the value
    #[inline]
    pub fn get(&self) -> i64 {
        self.inner.get()
    }

    /// The resolved (never `Auto`) strategy
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the name of the active strategy
    #[inline]
    pub fn strategy_name(&self) -> &'static str {
        self.inner.name()
    }

    /// Failed CAS attempts, for the lock-free strategy only
    pub fn cas_retries(&self) -> Option<u64> {
        match &self.inner {
            CounterImpl::LockFree(c) => Some(c.retries()),
            _ => None,
        }
    }
}

impl Default for SynchronizedCounter {
    fn default() -> Self {
        Self::new(Strategy::Auto)
    }
}

impl CounterOps for SynchronizedCounter {
    #[inline]
    fn increment(&self) -> i64 {
        SynchronizedCounter::increment(self)
    }

    #[inline]
    fn get(&self) -> i64 {
        SynchronizedCounter::get(self)
    }

    fn name(&self) -> &'static str {
        self.strategy_name()
    }
}

impl fmt::Debug for SynchronizedCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronizedCounter")
            .field("strategy", &self.strategy)
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::CounterError;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_each_strategy_counts() {
        for strategy in Strategy::CONCRETE {
            let counter = SynchronizedCounter::new(strategy);
            assert_eq!(counter.strategy(), strategy);
            assert_eq!(counter.strategy_name(), strategy.as_str());
            assert_eq!(counter.increment(), 1);
            assert_eq!(counter.increment(), 2);
            assert_eq!(counter.get(), 2);
        }
    }

    #[test]
    fn test_auto_resolves() {
        let counter = SynchronizedCounter::default();
        assert_ne!(counter.strategy(), Strategy::Auto);
        assert_ne!(counter.strategy(), Strategy::SpinLock);
    }

    #[test]
    fn test_with_initial() {
        let counter = SynchronizedCounter::with_initial(Strategy::SpinLock, 100);
        assert_eq!(counter.get(), 100);
        assert_eq!(counter.increment(), 101);
    }

    #[test]
    fn test_from_config() {
        let config = CounterConfig::low_latency().with_initial(-3);
        let counter = SynchronizedCounter::from_config(&config).unwrap();
        assert_eq!(counter.strategy(), Strategy::SpinLock);
        assert_eq!(counter.get(), -3);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = CounterConfig::default();
        config.spin.spin_limit = 0;
        let result = SynchronizedCounter::from_config(&config);
        assert!(matches!(result, Err(CounterError::InvalidConfig(_))));
    }

    #[test]
    fn test_cas_retries_only_for_lock_free() {
        assert!(SynchronizedCounter::new(Strategy::LockFree)
            .cas_retries()
            .is_some());
        assert!(SynchronizedCounter::new(Strategy::ExclusiveLock)
            .cas_retries()
            .is_none());
    }

    #[test]
    fn test_shared_via_arc() {
        let counter = Arc::new(SynchronizedCounter::new(Strategy::ExclusiveLock));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..250 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.get(), 1000);
    }

    #[test]
    fn test_debug_shows_strategy() {
        let counter = SynchronizedCounter::new(Strategy::LockFree);
        counter.increment();
        let rendered = format!("{:?}", counter);
        assert!(rendered.contains("LockFree"));
        assert!(rendered.contains("value: 1"));
    }
}
