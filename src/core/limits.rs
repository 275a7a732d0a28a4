/*!
 * Counter Limits and Constants
 *
 * Centralized location for tuning limits and thresholds.
 * Performance-critical constants are marked with [PERF].
 */

use std::time::Duration;

// =============================================================================
// SPIN LOCK BACKOFF
// =============================================================================

/// Tight `spin_loop()` polls before the spin lock starts yielding
/// [PERF] Roughly the cost of one uncontended cache-line transfer
pub const DEFAULT_SPIN_LIMIT: u32 = 64;

/// Polls after which every failed attempt yields to the scheduler
pub const DEFAULT_YIELD_LIMIT: u32 = 256;

/// Upper bound accepted for `spin_limit` in configuration
pub const MAX_SPIN_LIMIT: u32 = 1 << 16;

/// Tight spin budget for the low-latency preset
pub const LOW_LATENCY_SPIN_LIMIT: u32 = 512;

/// Yield threshold for the low-latency preset
pub const LOW_LATENCY_YIELD_LIMIT: u32 = 2048;

// =============================================================================
// STRESS DRIVER
// =============================================================================

/// Default window between read and write in the racy baseline
/// Widens the race so lost updates show up on every platform
pub const RACY_DEFAULT_WINDOW: Duration = Duration::from_micros(1);

/// Increments per thread in the oversubscribed scenario
pub const EXTREME_INCREMENTS_PER_THREAD: u64 = 1000;

/// Thread multiplier over available parallelism for the oversubscribed scenario
pub const EXTREME_THREAD_FACTOR: usize = 4;

/// Fallback thread count when parallelism cannot be detected
pub const EXTREME_FALLBACK_THREADS: usize = 64;

/// Writer threads in the timed stability run
pub const STABILITY_WORKERS: usize = 8;

/// Default length of the timed stability run
pub const DEFAULT_STABILITY_RUN: Duration = Duration::from_secs(10);
