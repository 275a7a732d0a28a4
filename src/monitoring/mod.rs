/*!
 * Monitoring
 * Structured tracing setup and teardown diagnostics
 */

mod diagnostics;
mod tracer;

pub(crate) use diagnostics::record_busy_teardown;
pub use diagnostics::busy_teardowns;
pub use tracer::{init_tracing, span_scenario, ScenarioSpan};
