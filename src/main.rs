/*!
 * Counter Stress - Main Entry Point
 *
 * Runs the scenario table, a mixed read/write pass and a timed stability
 * pass against every counter strategy and reports consistency and throughput:
 * - COUNTER_STRATEGY restricts the run to one strategy
 * - COUNTER_STABILITY_SECS sets the stability pass length
 * - `--json` prints every report as JSON on stdout
 */

use anyhow::{bail, Context};
use sync_counter::core::limits::RACY_DEFAULT_WINDOW;
use sync_counter::stress::extreme_scenario;
use sync_counter::{
    init_tracing, run_increment_stress, run_mixed, run_stability, standard_scenarios,
    CounterConfig, MixedWorkload, RacyCounter, RunSummary, Strategy, StressScenario,
    StressSettings, SynchronizedCounter,
};
use tracing::{debug, info, warn};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let json = std::env::args().skip(1).any(|arg| arg == "--json");
    let config = CounterConfig::from_env().context("loading counter configuration")?;
    let settings = StressSettings::from_env().context("loading stress settings")?;

    let strategies: Vec<Strategy> = if std::env::var_os("COUNTER_STRATEGY").is_some() {
        vec![config.select_strategy()]
    } else {
        Strategy::CONCRETE.to_vec()
    };

    let mut scenarios = standard_scenarios();
    scenarios.push(extreme_scenario());

    info!("Counter stress run starting...");
    info!("================================================");

    let mut summary = RunSummary::default();
    for strategy in strategies {
        let config = config.clone().with_strategy(strategy);
        info!(strategy = %strategy, scenarios = scenarios.len(), "Running strategy");

        for scenario in &scenarios {
            // Fresh counter per scenario
            let counter = SynchronizedCounter::from_config(&config)?;
            let report = run_increment_stress(&counter, scenario);

            info!(
                strategy = report.strategy,
                scenario = %report.name,
                threads = report.threads,
                ops = report.total_ops,
                duration_ms = %format!("{:.2}", report.duration_ms),
                throughput = %format!("{:.0}", report.throughput_ops_per_sec),
                passed = report.passed,
                "scenario finished"
            );
            if let Some(retries) = counter.cas_retries() {
                debug!(scenario = %report.name, retries, "CAS contention");
            }

            summary.scenarios.push(report);
        }

        let counter = SynchronizedCounter::from_config(&config)?;
        let mixed = run_mixed(&counter, MixedWorkload::default());
        info!(
            strategy = mixed.strategy,
            reads = mixed.total_reads,
            regressions = mixed.regressions,
            writer_panics = mixed.writer_panics,
            consistent = mixed.is_consistent(),
            "mixed read/write finished"
        );
        summary.mixed.push(mixed);

        let counter = SynchronizedCounter::from_config(&config)?;
        let stability = run_stability(&counter, settings.stability_workers, settings.stability_run);
        info!(
            strategy = stability.strategy,
            duration_ms = %format!("{:.0}", stability.duration_ms),
            increments = stability.increments,
            reads = stability.reads,
            regressions = stability.regressions,
            consistent = stability.consistent,
            "stability run finished"
        );
        summary.stability.push(stability);
    }

    // Cautionary baseline; never counted as a pass/fail result
    let racy = RacyCounter::unsynchronized(RACY_DEFAULT_WINDOW);
    let baseline = run_increment_stress(&racy, &StressScenario::new("racy-baseline", 3, 1_000));
    warn!(
        expected = baseline.expected,
        actual = baseline.actual,
        lost = racy.lost_updates(baseline.expected),
        "unsynchronized baseline (lost updates expected)"
    );

    let failures = summary.failures();
    info!("================================================");
    info!(
        total = summary.total(),
        passed = summary.total() - failures,
        failed = failures,
        avg_throughput = %format!("{:.0}", summary.average_throughput()),
        "Counter stress run complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if failures > 0 {
        bail!("{failures} run(s) lost updates or saw inconsistent reads");
    }
    Ok(())
}
