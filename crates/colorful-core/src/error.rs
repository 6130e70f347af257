//! Error types.

use thiserror::Error;

/// Errors raised while building picker components.
#[derive(Debug, Error)]
pub enum ColorfulError {
    #[error("No tokio runtime available to schedule deferred calls")]
    NoRuntime,
    #[error("Invalid props JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a coalesced call that did not produce a value.
///
/// Cloned once per waiter, so every caller of a burst sees the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThrottleError<E> {
    /// The wrapped function returned an error.
    #[error("Throttled call failed: {0}")]
    Failed(E),
    /// The wrapped function panicked.
    #[error("Throttled call panicked: {0}")]
    Panicked(String),
    /// The timer was dropped before it fired (runtime shut down).
    #[error("Throttled call was abandoned before it ran")]
    Abandoned,
}
