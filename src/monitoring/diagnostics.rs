/*!
 * Teardown Diagnostics
 *
 * Drop cannot return errors, so a counter torn down while its lock is still
 * held is recorded here and logged instead.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::error;

static BUSY_TEARDOWNS: AtomicU64 = AtomicU64::new(0);

/// Number of lock-based counters dropped while their lock was held
pub fn busy_teardowns() -> u64 {
    BUSY_TEARDOWNS.load(Ordering::Relaxed)
}

/// Record a busy teardown
///
/// Only reachable when a lock guard was leaked, since safe code cannot drop
/// a counter that another thread still borrows.
pub(crate) fn record_busy_teardown(strategy: &'static str) {
    let total = BUSY_TEARDOWNS.fetch_add(1, Ordering::Relaxed) + 1;
    error!(
        strategy = strategy,
        total = total,
        "counter dropped while its lock was still held"
    );
}
