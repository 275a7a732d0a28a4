/*!
 * Counter Configuration
 *
 * Runtime configuration for strategy selection and spin backoff tuning
 */

use crate::core::errors::{CounterError, CounterResult};
use crate::core::limits::{
    DEFAULT_SPIN_LIMIT, DEFAULT_YIELD_LIMIT, LOW_LATENCY_SPIN_LIMIT, LOW_LATENCY_YIELD_LIMIT,
    MAX_SPIN_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Strategy type selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Blocking mutex (parking_lot, cross-platform, works at any contention)
    ExclusiveLock,
    /// Busy-wait lock (low latency for very short holds, burns CPU while waiting)
    SpinLock,
    /// Compare-and-swap retry loop (never blocks)
    LockFree,
    /// Auto-select based on platform; never selects `SpinLock`
    #[default]
    Auto,
}

impl Strategy {
    /// The three concrete strategies, in a stable order
    pub const CONCRETE: [Strategy; 3] =
        [Strategy::ExclusiveLock, Strategy::SpinLock, Strategy::LockFree];

    /// Resolve `Auto` to a concrete strategy for the current platform
    pub fn resolve(self) -> Strategy {
        match self {
            Strategy::Auto => {
                // Prefer the lock-free path wherever 64-bit atomics are native
                #[cfg(target_has_atomic = "64")]
                {
                    Strategy::LockFree
                }
                #[cfg(not(target_has_atomic = "64"))]
                {
                    Strategy::ExclusiveLock
                }
            }
            other => other,
        }
    }

    /// Canonical name
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::ExclusiveLock => "exclusive-lock",
            Strategy::SpinLock => "spin-lock",
            Strategy::LockFree => "lock-free",
            Strategy::Auto => "auto",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mutex" | "exclusive-lock" | "exclusive_lock" => Ok(Strategy::ExclusiveLock),
            "spin" | "spin-lock" | "spin_lock" | "spinlock" => Ok(Strategy::SpinLock),
            "atomic" | "lock-free" | "lock_free" | "lockfree" | "cas" => Ok(Strategy::LockFree),
            "auto" => Ok(Strategy::Auto),
            other => Err(CounterError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Spin lock backoff configuration
///
/// Polls `0..spin_limit` use a CPU spin hint. Polls `spin_limit..yield_limit`
/// alternate between spin hints and scheduler yields. From `yield_limit` on,
/// every failed poll yields. The lock never parks the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinConfig {
    pub spin_limit: u32,
    pub yield_limit: u32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            spin_limit: DEFAULT_SPIN_LIMIT,
            yield_limit: DEFAULT_YIELD_LIMIT,
        }
    }
}

impl SpinConfig {
    /// Check the limits are usable
    pub fn validate(&self) -> CounterResult<()> {
        if self.spin_limit == 0 || self.spin_limit > MAX_SPIN_LIMIT {
            return Err(CounterError::InvalidConfig(format!(
                "spin_limit must be in 1..={}, got {}",
                MAX_SPIN_LIMIT, self.spin_limit
            )));
        }
        if self.yield_limit < self.spin_limit {
            return Err(CounterError::InvalidConfig(format!(
                "yield_limit ({}) must be >= spin_limit ({})",
                self.yield_limit, self.spin_limit
            )));
        }
        Ok(())
    }
}

/// Counter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Preferred strategy
    pub strategy: Strategy,
    /// Starting value
    pub initial: i64,
    /// Backoff tuning (only read by `SpinLock`)
    pub spin: SpinConfig,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            initial: 0,
            spin: SpinConfig::default(),
        }
    }
}

impl CounterConfig {
    /// Configuration for very short critical sections on dedicated cores
    pub const fn low_latency() -> Self {
        Self {
            strategy: Strategy::SpinLock,
            initial: 0,
            spin: SpinConfig {
                spin_limit: LOW_LATENCY_SPIN_LIMIT,
                yield_limit: LOW_LATENCY_YIELD_LIMIT,
            },
        }
    }

    /// Configuration for many writers hammering the same counter
    pub const fn high_contention() -> Self {
        Self {
            strategy: Strategy::LockFree,
            initial: 0,
            spin: SpinConfig {
                spin_limit: DEFAULT_SPIN_LIMIT,
                yield_limit: DEFAULT_YIELD_LIMIT,
            },
        }
    }

    /// Builder-style strategy override
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder-style initial value override
    pub fn with_initial(mut self, initial: i64) -> Self {
        self.initial = initial;
        self
    }

    /// Load configuration from the environment
    ///
    /// Environment variables:
    /// - COUNTER_STRATEGY: mutex | spin | atomic | auto (default: auto)
    /// - COUNTER_INITIAL: starting value (default: 0)
    /// - COUNTER_SPIN_LIMIT / COUNTER_YIELD_LIMIT: spin backoff tuning
    pub fn from_env() -> CounterResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> CounterResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("COUNTER_STRATEGY") {
            config.strategy = raw.parse()?;
        }
        if let Some(raw) = lookup("COUNTER_INITIAL") {
            config.initial = parse_var("COUNTER_INITIAL", &raw)?;
        }
        if let Some(raw) = lookup("COUNTER_SPIN_LIMIT") {
            config.spin.spin_limit = parse_var("COUNTER_SPIN_LIMIT", &raw)?;
        }
        if let Some(raw) = lookup("COUNTER_YIELD_LIMIT") {
            config.spin.yield_limit = parse_var("COUNTER_YIELD_LIMIT", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> CounterResult<()> {
        self.spin.validate().inspect_err(|e| {
            warn!(strategy = %self.strategy, error = %e, "Rejected counter configuration");
        })
    }

    /// Select the concrete strategy for the current platform
    pub fn select_strategy(&self) -> Strategy {
        self.strategy.resolve()
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> CounterResult<T>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| CounterError::InvalidConfig(format!("{key}={raw:?}: {e}")))
}
