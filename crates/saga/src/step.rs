//! The step capability executed by the saga engine.

use async_trait::async_trait;

use crate::error::StepError;

/// A named pair of idempotent-by-contract operations.
///
/// `action` applies the forward effect against a resource; `compensation`
/// undoes it. The engine invokes `action` at most once per run and invokes
/// `compensation` only for steps whose action previously reported success
/// within the same run.
///
/// Implementors should be explicit structs holding the resource handles they
/// need (see [`crate::services`]), so ownership of a connection or client is
/// visible at the construction site. Both operations must be correct in
/// isolation: the engine acquires no locks on the resources they touch.
#[async_trait]
pub trait Step: Send + Sync {
    /// Human-readable step name, unique within a saga instance.
    fn name(&self) -> &str;

    /// Applies the forward effect.
    ///
    /// Any `Err` is treated as a failure signal; the payload is transported
    /// to the terminal outcome without interpretation.
    async fn action(&self) -> Result<(), StepError>;

    /// Undoes the effect of a previously successful `action`.
    async fn compensation(&self) -> Result<(), StepError>;
}
