/*!
 * Sync Counter Library
 * Thread-safe counters with pluggable synchronization strategies
 */

pub mod core;
pub mod monitoring;
pub mod stress;

// Re-exports
pub use crate::core::errors::{CounterError, CounterResult, WaitError, WaitResult};
pub use crate::core::sync::{
    AtomicCounter, CounterConfig, CounterOps, MutexCounter, RacyCounter, Rendezvous, SpinConfig,
    SpinCounter, Strategy, SynchronizedCounter, WakeResult,
};
pub use monitoring::{busy_teardowns, init_tracing};
pub use stress::{
    run_increment_stress, run_mixed, run_stability, standard_scenarios, MixedReport,
    MixedWorkload, RunSummary, StabilityReport, StressReport, StressScenario, StressSettings,
};
