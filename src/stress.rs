/*!
 * Stress Driver
 *
 * Drives any `CounterOps` implementation with concurrent workers and
 * reports consistency and throughput:
 * - Increment runs: N threads × K increments, join, one final read
 * - Mixed runs: writers and readers at the same time
 * - Stability runs: workers increment until a deadline while a reader watches
 *
 * `RunSummary` collects all three so a caller can report them together and
 * count failures in one place.
 *
 * The driver borrows the counter and uses scoped threads, so every worker
 * is joined before the counter can be dropped.
 */

use crate::core::errors::{CounterError, CounterResult};
use crate::core::limits::{
    DEFAULT_STABILITY_RUN, EXTREME_FALLBACK_THREADS, EXTREME_INCREMENTS_PER_THREAD,
    EXTREME_THREAD_FACTOR, STABILITY_WORKERS,
};
use crate::core::sync::CounterOps;
use crate::monitoring::span_scenario;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

/// One increment-only workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    pub threads: usize,
    pub increments_per_thread: u64,
}

impl StressScenario {
    pub fn new(name: impl Into<String>, threads: usize, increments_per_thread: u64) -> Self {
        Self {
            name: name.into(),
            threads,
            increments_per_thread,
        }
    }

    /// Total increments across all threads
    pub fn total_ops(&self) -> u64 {
        (self.threads as u64).saturating_mul(self.increments_per_thread)
    }
}

/// Scenario table run by the `counter-stress` binary
pub fn standard_scenarios() -> Vec<StressScenario> {
    vec![
        StressScenario::new("light", 4, 1_000),
        StressScenario::new("medium", 8, 5_000),
        StressScenario::new("heavy", 16, 10_000),
        StressScenario::new("high-concurrency", 32, 2_000),
        StressScenario::new("bulk", 8, 50_000),
    ]
}

/// Oversubscribed scenario: several threads per available core
pub fn extreme_scenario() -> StressScenario {
    let threads = thread::available_parallelism()
        .map(|n| n.get() * EXTREME_THREAD_FACTOR)
        .unwrap_or(EXTREME_FALLBACK_THREADS);
    StressScenario::new("extreme", threads, EXTREME_INCREMENTS_PER_THREAD)
}

/// Outcome of an increment run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressReport {
    pub name: String,
    pub strategy: &'static str,
    pub threads: usize,
    pub increments_per_thread: u64,
    pub duration_ms: f64,
    pub expected: i64,
    pub actual: i64,
    pub passed: bool,
    pub total_ops: u64,
    pub throughput_ops_per_sec: f64,
}

/// Run `scenario` against `counter` and compare the final value
pub fn run_increment_stress<C>(counter: &C, scenario: &StressScenario) -> StressReport
where
    C: CounterOps + ?Sized,
{
    let span = span_scenario(&scenario.name, counter.name(), scenario.threads);
    let initial = counter.get();
    let start = Instant::now();

    thread::scope(|s| {
        for _ in 0..scenario.threads {
            s.spawn(|| {
                for _ in 0..scenario.increments_per_thread {
                    counter.increment();
                }
            });
        }
    });

    let elapsed = start.elapsed();
    let actual = counter.get();
    let total_ops = scenario.total_ops();
    let expected = initial.wrapping_add(total_ops as i64);
    let passed = actual == expected;
    span.record_outcome(passed);

    if !passed {
        warn!(
            scenario = %scenario.name,
            strategy = counter.name(),
            expected,
            actual,
            "lost updates detected"
        );
    }

    StressReport {
        name: scenario.name.clone(),
        strategy: counter.name(),
        threads: scenario.threads,
        increments_per_thread: scenario.increments_per_thread,
        duration_ms: elapsed.as_secs_f64() * 1000.0,
        expected,
        actual,
        passed,
        total_ops,
        throughput_ops_per_sec: throughput(total_ops, elapsed),
    }
}

/// Concurrent writers and readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedWorkload {
    pub writers: usize,
    pub writes_per_writer: u64,
    pub readers: usize,
    pub reads_per_reader: u64,
    /// Pause after each operation, zero for none
    pub pause: Duration,
}

impl Default for MixedWorkload {
    fn default() -> Self {
        Self {
            writers: 4,
            writes_per_writer: 1_000,
            readers: 4,
            reads_per_reader: 1_000,
            pause: Duration::ZERO,
        }
    }
}

/// Outcome of a mixed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedReport {
    pub strategy: &'static str,
    pub duration_ms: f64,
    pub expected: i64,
    pub actual: i64,
    pub passed: bool,
    pub total_reads: u64,
    /// Reads lower than the same reader's previous read
    pub regressions: u64,
    /// Reads below the value observed before the run
    pub below_initial: u64,
    /// Writer threads that panicked before finishing their writes
    pub writer_panics: u64,
}

impl MixedReport {
    /// Final count matched, every writer finished and every snapshot was sane
    pub fn is_consistent(&self) -> bool {
        self.passed && self.writer_panics == 0 && self.regressions == 0 && self.below_initial == 0
    }
}

/// Run writers and readers together
///
/// Readers stop after `reads_per_reader` reads or once every writer has
/// finished, whichever comes first.
pub fn run_mixed<C>(counter: &C, workload: MixedWorkload) -> MixedReport
where
    C: CounterOps + ?Sized,
{
    let span = span_scenario("mixed", counter.name(), workload.writers + workload.readers);
    let initial = counter.get();
    let stop = AtomicBool::new(false);
    let total_reads = AtomicU64::new(0);
    let regressions = AtomicU64::new(0);
    let below_initial = AtomicU64::new(0);
    let mut writer_panics = 0u64;
    let start = Instant::now();

    thread::scope(|s| {
        let writers: Vec<_> = (0..workload.writers)
            .map(|_| {
                s.spawn(|| {
                    for _ in 0..workload.writes_per_writer {
                        counter.increment();
                        pause(workload.pause);
                    }
                })
            })
            .collect();

        for _ in 0..workload.readers {
            s.spawn(|| {
                let mut last = initial;
                for _ in 0..workload.reads_per_reader {
                    if stop.load(Ordering::Acquire) {
                        break;
                    }
                    let value = counter.get();
                    total_reads.fetch_add(1, Ordering::Relaxed);
                    if value < last {
                        regressions.fetch_add(1, Ordering::Relaxed);
                    }
                    if value < initial {
                        below_initial.fetch_add(1, Ordering::Relaxed);
                    }
                    last = value;
                    pause(workload.pause);
                }
            });
        }

        for (index, writer) in writers.into_iter().enumerate() {
            if let Err(payload) = writer.join() {
                writer_panics += 1;
                warn!(
                    strategy = counter.name(),
                    writer = index,
                    panic = panic_message(payload.as_ref()),
                    "mixed-run writer panicked"
                );
            }
        }
        stop.store(true, Ordering::Release);
    });

    let elapsed = start.elapsed();
    let actual = counter.get();
    let writes = (workload.writers as u64).saturating_mul(workload.writes_per_writer);
    let expected = initial.wrapping_add(writes as i64);
    let passed = actual == expected;
    span.record_outcome(passed && writer_panics == 0);

    MixedReport {
        strategy: counter.name(),
        duration_ms: elapsed.as_secs_f64() * 1000.0,
        expected,
        actual,
        passed,
        total_reads: total_reads.into_inner(),
        regressions: regressions.into_inner(),
        below_initial: below_initial.into_inner(),
        writer_panics,
    }
}

/// Outcome of a timed stability run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityReport {
    pub strategy: &'static str,
    pub duration_ms: f64,
    pub increments: u64,
    pub reads: u64,
    pub final_value: i64,
    pub regressions: u64,
    pub consistent: bool,
    pub throughput_ops_per_sec: f64,
}

/// Increment from `workers` threads until `run_for` elapses
///
/// Even-numbered workers pause briefly between increments so the counter
/// sees both bursty and steady writers.
pub fn run_stability<C>(counter: &C, workers: usize, run_for: Duration) -> StabilityReport
where
    C: CounterOps + ?Sized,
{
    let span = span_scenario("stability", counter.name(), workers + 1);
    let initial = counter.get();
    let stop = AtomicBool::new(false);
    let increments = AtomicU64::new(0);
    let reads = AtomicU64::new(0);
    let regressions = AtomicU64::new(0);
    let start = Instant::now();

    thread::scope(|s| {
        for worker in 0..workers {
            let stop = &stop;
            let increments = &increments;
            s.spawn(move || {
                let mut local = 0u64;
                while !stop.load(Ordering::Acquire) {
                    counter.increment();
                    local += 1;
                    if worker % 2 == 0 {
                        thread::sleep(Duration::from_micros(10));
                    }
                }
                increments.fetch_add(local, Ordering::Relaxed);
            });
        }

        s.spawn(|| {
            let mut last = initial;
            while !stop.load(Ordering::Acquire) {
                let value = counter.get();
                reads.fetch_add(1, Ordering::Relaxed);
                if value < last {
                    regressions.fetch_add(1, Ordering::Relaxed);
                }
                last = value;
                thread::sleep(Duration::from_micros(5));
            }
        });

        thread::sleep(run_for);
        stop.store(true, Ordering::Release);
    });

    let elapsed = start.elapsed();
    let increments = increments.into_inner();
    let final_value = counter.get();
    let regressions = regressions.into_inner();
    let consistent = final_value == initial.wrapping_add(increments as i64) && regressions == 0;
    span.record_outcome(consistent);

    StabilityReport {
        strategy: counter.name(),
        duration_ms: elapsed.as_secs_f64() * 1000.0,
        increments,
        reads: reads.into_inner(),
        final_value,
        regressions,
        consistent,
        throughput_ops_per_sec: throughput(increments, elapsed),
    }
}

/// Driver settings read from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressSettings {
    /// Length of each timed stability run
    pub stability_run: Duration,
    /// Writer threads in each stability run
    pub stability_workers: usize,
}

impl Default for StressSettings {
    fn default() -> Self {
        Self {
            stability_run: DEFAULT_STABILITY_RUN,
            stability_workers: STABILITY_WORKERS,
        }
    }
}

impl StressSettings {
    /// Load settings from the environment
    ///
    /// Environment variables:
    /// - COUNTER_STABILITY_SECS: stability run length in seconds, fractions allowed (default: 10)
    pub fn from_env() -> CounterResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> CounterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup("COUNTER_STABILITY_SECS") {
            let secs: f64 = raw.trim().parse().map_err(|e| {
                CounterError::InvalidConfig(format!("COUNTER_STABILITY_SECS={raw:?}: {e}"))
            })?;
            settings.stability_run = Duration::try_from_secs_f64(secs).map_err(|e| {
                CounterError::InvalidConfig(format!("COUNTER_STABILITY_SECS={raw:?}: {e}"))
            })?;
        }

        Ok(settings)
    }
}

/// Every report from one driver run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub scenarios: Vec<StressReport>,
    pub mixed: Vec<MixedReport>,
    pub stability: Vec<StabilityReport>,
}

impl RunSummary {
    /// Number of reports of any kind
    pub fn total(&self) -> usize {
        self.scenarios.len() + self.mixed.len() + self.stability.len()
    }

    /// Reports that lost updates or saw an inconsistent snapshot
    pub fn failures(&self) -> usize {
        self.scenarios.iter().filter(|r| !r.passed).count()
            + self.mixed.iter().filter(|r| !r.is_consistent()).count()
            + self.stability.iter().filter(|r| !r.consistent).count()
    }

    /// Mean throughput of the increment scenarios that passed
    pub fn average_throughput(&self) -> f64 {
        let passed: Vec<f64> = self
            .scenarios
            .iter()
            .filter(|r| r.passed)
            .map(|r| r.throughput_ops_per_sec)
            .collect();
        if passed.is_empty() {
            0.0
        } else {
            passed.iter().sum::<f64>() / passed.len() as f64
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[inline]
fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

fn throughput(ops: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        ops as f64 / secs
    } else {
        0.0
    }
}
