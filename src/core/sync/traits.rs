/*!
 * Synchronization Traits
 *
 * Core abstractions shared by every counter strategy.
 *
 * # Design: Trait-Based Abstraction for Implementations
 *
 * `SynchronizedCounter` uses enum dispatch on its hot path, while this
 * trait lets the stress driver and benchmarks run the same workload against
 * any strategy, including the racy baseline.
 */

/// Result of a notify operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }

    pub(crate) fn from_count(n: usize) -> Self {
        if n == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(n)
        }
    }
}

/// Operations every counter strategy exposes
///
/// Implementations must be:
/// - **Thread-safe**: callable from any number of threads through `&self`
/// - **Linearizable**: each `increment` returns a distinct value, and the
///   returned values form a gap-free sequence
///
/// `RacyCounter` also implements this trait so it can serve as a benchmark
/// baseline, but it does not uphold the linearizability contract.
pub trait CounterOps: Send + Sync {
    /// Add one and return the new value
    fn increment(&self) -> i64;

    /// Read a consistent snapshot of the value
    fn get(&self) -> i64;

    /// Get strategy name for debugging
    fn name(&self) -> &'static str;
}
