//! Structured step-transition events.
//!
//! The engine emits one event per state transition through an [`EventSink`]
//! the host provides, so the audit trail can be routed to any observability
//! pipeline. The [`Outcome`](crate::Outcome) returned by the engine remains
//! the authoritative result regardless of what is emitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::SagaId;

/// Events that can occur during saga execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// Saga execution started.
    SagaStarted(SagaStartedData),

    /// A saga step started execution.
    StepStarted(StepData),

    /// A saga step's action committed.
    StepCompleted(StepData),

    /// A saga step's action failed.
    StepFailed(StepFailedData),

    /// Compensation started after a step failure.
    CompensationStarted(CompensationData),

    /// A compensation completed successfully during unwind.
    CompensationStepCompleted(StepData),

    /// A compensation failed during unwind; the unwind stops here.
    CompensationStepFailed(StepFailedData),

    /// Saga completed successfully (terminal).
    SagaCompleted(SagaCompletedData),

    /// A step failed and all committed steps were undone (terminal).
    SagaCompensated(SagaCompensatedData),

    /// A compensation failed, leaving the unwind incomplete (terminal).
    SagaFailed(SagaFailedData),
}

impl SagaEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::SagaStarted(_) => "SagaStarted",
            SagaEvent::StepStarted(_) => "StepStarted",
            SagaEvent::StepCompleted(_) => "StepCompleted",
            SagaEvent::StepFailed(_) => "StepFailed",
            SagaEvent::CompensationStarted(_) => "CompensationStarted",
            SagaEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            SagaEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            SagaEvent::SagaCompleted(_) => "SagaCompleted",
            SagaEvent::SagaCompensated(_) => "SagaCompensated",
            SagaEvent::SagaFailed(_) => "SagaFailed",
        }
    }

    /// Returns the step name the event refers to, if any.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            SagaEvent::StepStarted(data)
            | SagaEvent::StepCompleted(data)
            | SagaEvent::CompensationStepCompleted(data) => Some(&data.step_name),
            SagaEvent::StepFailed(data) | SagaEvent::CompensationStepFailed(data) => {
                Some(&data.step_name)
            }
            SagaEvent::CompensationStarted(data) => Some(&data.from_step),
            _ => None,
        }
    }
}

/// Data for SagaStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaStartedData {
    /// The saga run ID.
    pub saga_id: SagaId,
    /// Number of steps in the saga.
    pub step_count: usize,
    /// When the saga started.
    pub started_at: DateTime<Utc>,
}

/// Data for events that carry just a step name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepData {
    /// The step name.
    pub step_name: String,
}

/// Data for StepFailed / CompensationStepFailed events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailedData {
    /// The step that failed.
    pub step_name: String,
    /// Error message describing the failure.
    pub error: String,
}

/// Data for CompensationStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationData {
    /// The step whose failure triggered compensation.
    pub from_step: String,
}

/// Data for SagaCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaCompletedData {
    /// When the saga completed.
    pub completed_at: DateTime<Utc>,
}

/// Data for SagaCompensated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaCompensatedData {
    /// The forward step whose failure triggered the unwind.
    pub failed_step: String,
    /// When the unwind finished.
    pub compensated_at: DateTime<Utc>,
}

/// Data for SagaFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaFailedData {
    /// The compensation that failed, stopping the unwind.
    pub stuck_at: String,
    /// Ledger entries never compensated, in commit order.
    pub remaining: Vec<String>,
    /// When the saga failed.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    /// Creates a SagaStarted event.
    pub fn saga_started(saga_id: SagaId, step_count: usize) -> Self {
        SagaEvent::SagaStarted(SagaStartedData {
            saga_id,
            step_count,
            started_at: Utc::now(),
        })
    }

    /// Creates a StepStarted event.
    pub fn step_started(step_name: impl Into<String>) -> Self {
        SagaEvent::StepStarted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a StepCompleted event.
    pub fn step_completed(step_name: impl Into<String>) -> Self {
        SagaEvent::StepCompleted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a StepFailed event.
    pub fn step_failed(step_name: impl Into<String>, error: impl Into<String>) -> Self {
        SagaEvent::StepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    /// Creates a CompensationStarted event.
    pub fn compensation_started(from_step: impl Into<String>) -> Self {
        SagaEvent::CompensationStarted(CompensationData {
            from_step: from_step.into(),
        })
    }

    /// Creates a CompensationStepCompleted event.
    pub fn compensation_step_completed(step_name: impl Into<String>) -> Self {
        SagaEvent::CompensationStepCompleted(StepData {
            step_name: step_name.into(),
        })
    }

    /// Creates a CompensationStepFailed event.
    pub fn compensation_step_failed(
        step_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        SagaEvent::CompensationStepFailed(StepFailedData {
            step_name: step_name.into(),
            error: error.into(),
        })
    }

    /// Creates a SagaCompleted event.
    pub fn saga_completed() -> Self {
        SagaEvent::SagaCompleted(SagaCompletedData {
            completed_at: Utc::now(),
        })
    }

    /// Creates a SagaCompensated event.
    pub fn saga_compensated(failed_step: impl Into<String>) -> Self {
        SagaEvent::SagaCompensated(SagaCompensatedData {
            failed_step: failed_step.into(),
            compensated_at: Utc::now(),
        })
    }

    /// Creates a SagaFailed event.
    pub fn saga_failed(stuck_at: impl Into<String>, remaining: Vec<String>) -> Self {
        SagaEvent::SagaFailed(SagaFailedData {
            stuck_at: stuck_at.into(),
            remaining,
            failed_at: Utc::now(),
        })
    }
}

/// Receives the engine's step-transition events.
///
/// Emission is a side channel: sinks must not fail, and the engine does not
/// wait on anything beyond the call itself.
pub trait EventSink: Send + Sync {
    /// Consumes one event.
    fn emit(&self, event: SagaEvent);
}

/// Sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SagaEvent) {}
}

/// Sink that records events in memory, for tests and inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: std::sync::Arc<std::sync::Mutex<Vec<SagaEvent>>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events in emission order.
    pub fn events(&self) -> Vec<SagaEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the recorded event type names in emission order.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(SagaEvent::event_type)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SagaEvent) {
        self.events.lock().unwrap().push(event);
    }
}
