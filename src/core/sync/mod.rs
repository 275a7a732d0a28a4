/*!
 * Synchronization Primitives
 *
 * A thread-safe counter with pluggable synchronization strategy, plus a
 * predicate-guarded rendezvous:
 * - Exclusive lock (parking_lot mutex) for any contention level
 * - Spin lock for very short critical sections
 * - Lock-free CAS loop that never blocks
 * - Racy baseline that loses updates (benchmark and demonstration only)
 *
 * # Architecture
 *
 * Each strategy implements `CounterOps`. `SynchronizedCounter` selects one
 * at construction and dispatches through an enum, so callers pick the
 * capability (mutual exclusion or atomicity) without paying for dynamic
 * dispatch.
 */

mod atomic;
mod config;
mod counter;
mod mutex;
mod racy;
mod rendezvous;
mod spin;
mod traits;

pub use config::{CounterConfig, SpinConfig, Strategy};
pub use counter::SynchronizedCounter;
pub use rendezvous::Rendezvous;
pub use traits::{CounterOps, WakeResult};

// Re-export specific strategies for advanced users
pub use atomic::AtomicCounter;
pub use mutex::MutexCounter;
pub use racy::RacyCounter;
pub use spin::{SpinCounter, SpinGuard, SpinLock};
