//! Cacheable snapshot of a saga outcome.

use saga::Outcome;
use serde::{Deserialize, Serialize};

/// Serializable form of a terminal [`Outcome`], suitable for caching and for
/// returning verbatim to a retried request.
///
/// Opaque step errors are rendered to their display strings at capture time;
/// a cached record is the response body, not the live error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeRecord {
    /// All steps succeeded.
    Completed,

    /// A forward step failed and all prior commits were undone.
    Compensated {
        /// The step whose action failed.
        failed_step: String,
        /// Rendered failure message.
        cause: String,
    },

    /// A forward step failed and the unwind could not finish.
    CompensationFailed {
        /// The step whose action failed.
        failed_step: String,
        /// Rendered failure message.
        cause: String,
        /// The compensation that failed, stopping the unwind.
        stuck_at: String,
        /// Rendered compensation failure message.
        compensation_cause: String,
        /// Committed steps never compensated, in commit order.
        remaining: Vec<String>,
    },
}

impl OutcomeRecord {
    /// Returns true if the recorded run completed successfully.
    pub fn is_completed(&self) -> bool {
        matches!(self, OutcomeRecord::Completed)
    }
}

impl From<&Outcome> for OutcomeRecord {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Completed => OutcomeRecord::Completed,
            Outcome::Compensated { failed_step, cause } => OutcomeRecord::Compensated {
                failed_step: failed_step.clone(),
                cause: cause.to_string(),
            },
            Outcome::CompensationFailed {
                failed_step,
                cause,
                stuck_at,
                compensation_cause,
                remaining,
            } => OutcomeRecord::CompensationFailed {
                failed_step: failed_step.clone(),
                cause: cause.to_string(),
                stuck_at: stuck_at.clone(),
                compensation_cause: compensation_cause.to_string(),
                remaining: remaining.clone(),
            },
        }
    }
}
