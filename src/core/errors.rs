/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for counter construction and configuration
pub type CounterResult<T> = Result<T, CounterError>;

/// Counter errors with serialization support
///
/// Only configuration-driven construction can fail. `increment` and `get`
/// have no error path.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum CounterError {
    #[error("Invalid counter configuration: {0}")]
    #[diagnostic(
        code(counter::invalid_config),
        help("Check COUNTER_* environment variables and spin limits.")
    )]
    InvalidConfig(String),

    #[error("Unknown strategy: {0}")]
    #[diagnostic(
        code(counter::unknown_strategy),
        help("Expected one of: mutex, spin, atomic, auto.")
    )]
    UnknownStrategy(String),
}

/// Result type for rendezvous waits
pub type WaitResult<T> = Result<T, WaitError>;

/// Wait operation errors
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
pub enum WaitError {
    #[error("Wait operation timed out")]
    #[diagnostic(
        code(rendezvous::timeout),
        help("The predicate was still false at the deadline.")
    )]
    Timeout,
}
