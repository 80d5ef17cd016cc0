//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of a saga in its lifecycle.
///
/// State transitions:
/// ```text
/// Idle ──► Running ──┬──► Completed
///                    └──► Compensating ──┬──► Compensated
///                                        └──► CompensationFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// Saga has not started yet.
    #[default]
    Idle,

    /// Saga steps are being executed.
    Running,

    /// A step failed and compensating actions are in progress.
    Compensating,

    /// All steps completed successfully (terminal state).
    Completed,

    /// A step failed and every committed step was undone (terminal state).
    Compensated,

    /// A compensation itself failed, leaving committed steps unwound only
    /// partially (terminal state).
    CompensationFailed,
}

impl SagaState {
    /// Returns true if the saga can begin running.
    pub fn can_run(&self) -> bool {
        matches!(self, SagaState::Idle)
    }

    /// Returns true if the saga can begin compensation.
    pub fn can_compensate(&self) -> bool {
        matches!(self, SagaState::Running)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaState::Completed | SagaState::Compensated | SagaState::CompensationFailed
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Idle => "Idle",
            SagaState::Running => "Running",
            SagaState::Compensating => "Compensating",
            SagaState::Completed => "Completed",
            SagaState::Compensated => "Compensated",
            SagaState::CompensationFailed => "CompensationFailed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(SagaState::default(), SagaState::Idle);
    }

    #[test]
    fn test_can_run() {
        assert!(SagaState::Idle.can_run());
        assert!(!SagaState::Running.can_run());
        assert!(!SagaState::Compensating.can_run());
        assert!(!SagaState::Completed.can_run());
        assert!(!SagaState::Compensated.can_run());
        assert!(!SagaState::CompensationFailed.can_run());
    }

    #[test]
    fn test_can_compensate() {
        assert!(!SagaState::Idle.can_compensate());
        assert!(SagaState::Running.can_compensate());
        assert!(!SagaState::Compensating.can_compensate());
        assert!(!SagaState::Completed.can_compensate());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SagaState::Idle.is_terminal());
        assert!(!SagaState::Running.is_terminal());
        assert!(!SagaState::Compensating.is_terminal());
        assert!(SagaState::Completed.is_terminal());
        assert!(SagaState::Compensated.is_terminal());
        assert!(SagaState::CompensationFailed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(SagaState::Idle.to_string(), "Idle");
        assert_eq!(SagaState::Running.to_string(), "Running");
        assert_eq!(SagaState::Compensating.to_string(), "Compensating");
        assert_eq!(SagaState::Completed.to_string(), "Completed");
        assert_eq!(SagaState::Compensated.to_string(), "Compensated");
        assert_eq!(
            SagaState::CompensationFailed.to_string(),
            "CompensationFailed"
        );
    }

    #[test]
    fn test_serialization() {
        let state = SagaState::Compensating;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: SagaState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
