/*!
 * Structured Tracing
 * Subscriber setup and scenario spans using the tracing crate
 */

use std::time::Instant;
use tracing::{debug, info, span, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - COUNTER_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("COUNTER_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one stress scenario run
pub struct ScenarioSpan {
    span: tracing::Span,
    start: Instant,
}

impl ScenarioSpan {
    pub fn new(scenario: &str, strategy: &'static str, threads: usize) -> Self {
        let span = span!(
            Level::DEBUG,
            "scenario",
            scenario = scenario,
            strategy = strategy,
            threads = threads,
            duration_ms = tracing::field::Empty,
            passed = tracing::field::Empty,
        );

        span.in_scope(|| debug!("scenario started"));

        Self {
            span,
            start: Instant::now(),
        }
    }

    /// Record whether the final count matched
    pub fn record_outcome(&self, passed: bool) {
        self.span.record("passed", passed);
    }
}

impl Drop for ScenarioSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_ms", duration.as_millis() as u64);
        self.span
            .in_scope(|| debug!(duration_ms = duration.as_millis() as u64, "scenario completed"));
    }
}

/// Helper to create a scenario span
#[inline]
pub fn span_scenario(scenario: &str, strategy: &'static str, threads: usize) -> ScenarioSpan {
    ScenarioSpan::new(scenario, strategy, threads)
}
