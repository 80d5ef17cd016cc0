//! Terminal result of a saga run.

use crate::error::StepError;

/// The terminal outcome of one saga execution.
///
/// This is the authoritative result; emitted events are observability only.
/// The error payloads are transported from the failing step untouched.
#[derive(Debug)]
pub enum Outcome {
    /// All steps succeeded; the ledger covered the full step sequence.
    Completed,

    /// A forward step failed and every prior commit was successfully undone.
    Compensated {
        /// The step whose action failed.
        failed_step: String,
        /// The failure reported by that action.
        cause: StepError,
    },

    /// A forward step failed and the unwind could not finish. The resource
    /// state is inconsistent; the caller must escalate, since the engine has
    /// no further automatic remedy.
    CompensationFailed {
        /// The step whose action failed.
        failed_step: String,
        /// The failure reported by that action.
        cause: StepError,
        /// The step whose compensation failed, stopping the unwind.
        stuck_at: String,
        /// The failure reported by that compensation.
        compensation_cause: StepError,
        /// Committed steps never compensated, in commit order. Does not
        /// include `stuck_at`.
        remaining: Vec<String>,
    },
}

impl Outcome {
    /// Returns true if all steps succeeded.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// Returns the forward step that failed, if any.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Outcome::Completed => None,
            Outcome::Compensated { failed_step, .. }
            | Outcome::CompensationFailed { failed_step, .. } => Some(failed_step),
        }
    }

    /// Returns true if the saga left resources in an inconsistent state.
    pub fn requires_escalation(&self) -> bool {
        matches!(self, Outcome::CompensationFailed { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed => write!(f, "completed"),
            Outcome::Compensated { failed_step, cause } => {
                write!(f, "compensated after '{failed_step}' failed: {cause}")
            }
            Outcome::CompensationFailed {
                failed_step,
                stuck_at,
                compensation_cause,
                remaining,
                ..
            } => write!(
                f,
                "compensation stuck at '{stuck_at}' ({compensation_cause}) \
                 after '{failed_step}' failed; {} step(s) not compensated",
                remaining.len()
            ),
        }
    }
}
