//! Saga error types.

use thiserror::Error;

/// Opaque failure reported by a step's action or compensation.
///
/// The engine never inspects the payload; it only transports it into the
/// terminal [`Outcome`](crate::Outcome).
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Usage errors surfaced by the saga engine.
///
/// Step-level failures are not errors of the engine itself; they are part of
/// the terminal [`Outcome`](crate::Outcome).
#[derive(Debug, Error)]
pub enum SagaError {
    /// `execute` was invoked more than once on the same saga instance.
    #[error("saga has already been executed")]
    AlreadyExecuted,
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
