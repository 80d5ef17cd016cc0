//! Saga engine driving forward execution and reverse-order compensation.

use std::time::Instant;

use crate::error::{Result, SagaError, StepError};
use crate::events::{EventSink, NullSink, SagaEvent};
use crate::id::SagaId;
use crate::ledger::Ledger;
use crate::outcome::Outcome;
use crate::state::SagaState;
use crate::step::Step;

/// An ordered sequence of steps executed as one unit of work.
///
/// A saga is constructed once, executed exactly once by a [`SagaEngine`], and
/// discarded after producing its terminal [`Outcome`]. Steps are fixed before
/// execution; there is no insertion mid-run.
///
/// A saga with zero steps completes as a no-op with an empty ledger.
pub struct Saga {
    id: SagaId,
    steps: Vec<Box<dyn Step>>,
    ledger: Ledger,
    state: SagaState,
}

impl Saga {
    /// Creates an empty saga.
    pub fn new() -> Self {
        Self {
            id: SagaId::new(),
            steps: Vec::new(),
            ledger: Ledger::new(),
            state: SagaState::Idle,
        }
    }

    /// Creates a saga from an ordered list of steps.
    pub fn with_steps(steps: Vec<Box<dyn Step>>) -> Self {
        let mut saga = Self::new();
        saga.steps = steps;
        saga
    }

    /// Appends a step.
    ///
    /// Steps are fixed once execution starts: calling this on a saga that
    /// has already run is a usage error and leaves the step sequence
    /// unchanged.
    pub fn add_step(&mut self, step: Box<dyn Step>) -> Result<&mut Self> {
        if !self.state.can_run() {
            return Err(SagaError::AlreadyExecuted);
        }
        self.steps.push(step);
        Ok(self)
    }

    /// Returns the saga run ID.
    pub fn id(&self) -> SagaId {
        self.id
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Returns the number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the names of committed, not-yet-compensated steps in commit
    /// order.
    pub fn ledger_names(&self) -> Vec<String> {
        self.ledger
            .entries()
            .iter()
            .map(|&i| self.steps[i].name().to_string())
            .collect()
    }
}

impl Default for Saga {
    fn default() -> Self {
        Self::new()
    }
}

/// Executes sagas to a terminal outcome.
///
/// Steps run strictly sequentially within one `execute` call; compensations
/// run in strict reverse commit order. The engine holds no per-saga state, so
/// one engine may serve many independent sagas concurrently.
pub struct SagaEngine<E: EventSink = NullSink> {
    sink: E,
}

impl Default for SagaEngine<NullSink> {
    fn default() -> Self {
        Self { sink: NullSink }
    }
}

impl SagaEngine<NullSink> {
    /// Creates an engine that discards events.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: EventSink> SagaEngine<E> {
    /// Creates an engine emitting step-transition events into `sink`.
    pub fn with_sink(sink: E) -> Self {
        Self { sink }
    }

    /// Runs the saga to a terminal state.
    ///
    /// Invokes each step's action in order, appending to the ledger on
    /// success. On the first action failure, compensates the ledger tail-first
    /// and reports [`Outcome::Compensated`], or [`Outcome::CompensationFailed`]
    /// if a compensation itself fails (the unwind stops at that point; no
    /// retries). Returns [`SagaError::AlreadyExecuted`] if this saga instance
    /// has run before, with no further side effects.
    #[tracing::instrument(skip(self, saga), fields(saga_id = %saga.id))]
    pub async fn execute(&self, saga: &mut Saga) -> Result<Outcome> {
        if !saga.state.can_run() {
            return Err(SagaError::AlreadyExecuted);
        }

        metrics::counter!("saga_executions_total").increment(1);
        let start = Instant::now();

        saga.state = SagaState::Running;
        self.sink
            .emit(SagaEvent::saga_started(saga.id, saga.steps.len()));

        for index in 0..saga.steps.len() {
            let name = saga.steps[index].name().to_string();
            tracing::info!(step = %name, "saga step started");
            self.sink.emit(SagaEvent::step_started(&name));

            match saga.steps[index].action().await {
                Ok(()) => {
                    saga.ledger.commit(index);
                    self.sink.emit(SagaEvent::step_completed(&name));
                }
                Err(cause) => {
                    tracing::warn!(step = %name, error = %cause, "saga step failed");
                    self.sink.emit(SagaEvent::step_failed(&name, cause.to_string()));

                    let outcome = self.compensate(saga, name, cause).await;
                    metrics::histogram!("saga_duration_seconds")
                        .record(start.elapsed().as_secs_f64());
                    return Ok(outcome);
                }
            }
        }

        saga.state = SagaState::Completed;
        self.sink.emit(SagaEvent::saga_completed());

        let duration = start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        metrics::counter!("saga_completed").increment(1);
        tracing::info!(saga_id = %saga.id, duration, "saga completed successfully");

        Ok(Outcome::Completed)
    }

    /// Unwinds the ledger tail-first after `failed_step`'s action failed.
    async fn compensate(&self, saga: &mut Saga, failed_step: String, cause: StepError) -> Outcome {
        saga.state = SagaState::Compensating;
        self.sink.emit(SagaEvent::compensation_started(&failed_step));

        while let Some(index) = saga.ledger.pop() {
            let name = saga.steps[index].name().to_string();
            tracing::info!(step = %name, "compensating saga step");

            match saga.steps[index].compensation().await {
                Ok(()) => {
                    self.sink.emit(SagaEvent::compensation_step_completed(&name));
                }
                Err(compensation_cause) => {
                    // The unwind halts here; remaining ledger entries stay
                    // uncompensated and must be escalated by the caller.
                    let remaining = saga.ledger_names();
                    saga.state = SagaState::CompensationFailed;
                    self.sink.emit(SagaEvent::compensation_step_failed(
                        &name,
                        compensation_cause.to_string(),
                    ));
                    self.sink
                        .emit(SagaEvent::saga_failed(&name, remaining.clone()));

                    metrics::counter!("saga_compensation_failed").increment(1);
                    tracing::error!(
                        saga_id = %saga.id,
                        failed_step = %failed_step,
                        stuck_at = %name,
                        error = %compensation_cause,
                        "saga compensation failed; resource state inconsistent"
                    );

                    return Outcome::CompensationFailed {
                        failed_step,
                        cause,
                        stuck_at: name,
                        compensation_cause,
                        remaining,
                    };
                }
            }
        }

        saga.state = SagaState::Compensated;
        self.sink.emit(SagaEvent::saga_compensated(&failed_step));

        metrics::counter!("saga_compensated").increment(1);
        tracing::warn!(saga_id = %saga.id, failed_step = %failed_step, "saga compensated");

        Outcome::Compensated { failed_step, cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Step that records invocation order in a shared trace.
    struct TraceStep {
        name: String,
        trace: Arc<Mutex<Vec<String>>>,
        fail_action: bool,
        fail_compensation: bool,
    }

    impl TraceStep {
        fn new(name: &str, trace: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                trace,
                fail_action: false,
                fail_compensation: false,
            }
        }

        fn failing_action(mut self) -> Self {
            self.fail_action = true;
            self
        }

        fn failing_compensation(mut self) -> Self {
            self.fail_compensation = true;
            self
        }
    }

    #[async_trait]
    impl Step for TraceStep {
        fn name(&self) -> &str {
            &self.name
        }

        async fn action(&self) -> std::result::Result<(), StepError> {
            if self.fail_action {
                return Err(format!("{} action failed", self.name).into());
            }
            self.trace.lock().unwrap().push(format!("do:{}", self.name));
            Ok(())
        }

        async fn compensation(&self) -> std::result::Result<(), StepError> {
            if self.fail_compensation {
                return Err(format!("{} compensation failed", self.name).into());
            }
            self.trace
                .lock()
                .unwrap()
                .push(format!("undo:{}", self.name));
            Ok(())
        }
    }

    fn trace() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let t = trace();
        let mut saga = Saga::with_steps(vec![
            Box::new(TraceStep::new("a", t.clone())),
            Box::new(TraceStep::new("b", t.clone())),
            Box::new(TraceStep::new("c", t.clone())),
        ]);

        let outcome = SagaEngine::new().execute(&mut saga).await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(saga.state(), SagaState::Completed);
        assert_eq!(saga.ledger_names(), vec!["a", "b", "c"]);
        assert_eq!(*t.lock().unwrap(), vec!["do:a", "do:b", "do:c"]);
    }

    #[tokio::test]
    async fn test_failure_compensates_in_reverse_order() {
        let t = trace();
        let mut saga = Saga::with_steps(vec![
            Box::new(TraceStep::new("a", t.clone())),
            Box::new(TraceStep::new("b", t.clone())),
            Box::new(TraceStep::new("c", t.clone()).failing_action()),
        ]);

        let outcome = SagaEngine::new().execute(&mut saga).await.unwrap();

        assert_eq!(outcome.failed_step(), Some("c"));
        assert!(matches!(outcome, Outcome::Compensated { .. }));
        assert_eq!(saga.state(), SagaState::Compensated);
        assert!(saga.ledger_names().is_empty());
        assert_eq!(
            *t.lock().unwrap(),
            vec!["do:a", "do:b", "undo:b", "undo:a"]
        );
    }

    #[tokio::test]
    async fn test_failed_step_compensation_never_runs() {
        let t = trace();
        let mut saga = Saga::with_steps(vec![
            Box::new(TraceStep::new("a", t.clone())),
            Box::new(TraceStep::new("b", t.clone()).failing_action()),
        ]);

        SagaEngine::new().execute(&mut saga).await.unwrap();

        assert_eq!(*t.lock().unwrap(), vec!["do:a", "undo:a"]);
    }

    #[tokio::test]
    async fn test_compensation_failure_halts_unwind() {
        let t = trace();
        let mut saga = Saga::with_steps(vec![
            Box::new(TraceStep::new("a", t.clone())),
            Box::new(TraceStep::new("b", t.clone()).failing_compensation()),
            Box::new(TraceStep::new("c", t.clone())),
            Box::new(TraceStep::new("d", t.clone()).failing_action()),
        ]);

        let outcome = SagaEngine::new().execute(&mut saga).await.unwrap();

        match outcome {
            Outcome::CompensationFailed {
                failed_step,
                stuck_at,
                remaining,
                ..
            } => {
                assert_eq!(failed_step, "d");
                assert_eq!(stuck_at, "b");
                assert_eq!(remaining, vec!["a"]);
            }
            other => panic!("expected CompensationFailed, got {other:?}"),
        }
        assert_eq!(saga.state(), SagaState::CompensationFailed);
        // c compensated, b's compensation failed, a never compensated
        assert_eq!(
            *t.lock().unwrap(),
            vec!["do:a", "do:b", "do:c", "undo:c"]
        );
        assert_eq!(saga.ledger_names(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_empty_saga_completes() {
        let mut saga = Saga::new();
        let outcome = SagaEngine::new().execute(&mut saga).await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(saga.state(), SagaState::Completed);
        assert!(saga.ledger_names().is_empty());
    }

    #[tokio::test]
    async fn test_second_execution_rejected() {
        let t = trace();
        let mut saga = Saga::with_steps(vec![Box::new(TraceStep::new("a", t.clone()))]);
        let engine = SagaEngine::new();

        engine.execute(&mut saga).await.unwrap();
        let second = engine.execute(&mut saga).await;

        assert!(matches!(second, Err(SagaError::AlreadyExecuted)));
        // No additional side effects on the second call
        assert_eq!(*t.lock().unwrap(), vec!["do:a"]);
    }

    #[tokio::test]
    async fn test_second_execution_rejected_after_compensation() {
        let t = trace();
        let mut saga =
            Saga::with_steps(vec![Box::new(TraceStep::new("a", t.clone()).failing_action())]);
        let engine = SagaEngine::new();

        engine.execute(&mut saga).await.unwrap();
        assert!(matches!(
            engine.execute(&mut saga).await,
            Err(SagaError::AlreadyExecuted)
        ));
    }

    #[tokio::test]
    async fn test_add_step_rejected_after_execution() {
        let t = trace();
        let mut saga = Saga::with_steps(vec![Box::new(TraceStep::new("a", t.clone()))]);
        SagaEngine::new().execute(&mut saga).await.unwrap();

        let result = saga.add_step(Box::new(TraceStep::new("late", t.clone())));
        assert!(matches!(result, Err(SagaError::AlreadyExecuted)));
        assert_eq!(saga.step_count(), 1);
    }

    #[tokio::test]
    async fn test_add_step_before_execution() {
        let t = trace();
        let mut saga = Saga::new();
        saga.add_step(Box::new(TraceStep::new("a", t.clone()))).unwrap();
        saga.add_step(Box::new(TraceStep::new("b", t.clone()))).unwrap();

        let outcome = SagaEngine::new().execute(&mut saga).await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(*t.lock().unwrap(), vec!["do:a", "do:b"]);
    }

    #[tokio::test]
    async fn test_event_stream_on_compensated_run() {
        let t = trace();
        let sink = RecordingSink::new();
        let engine = SagaEngine::with_sink(sink.clone());
        let mut saga = Saga::with_steps(vec![
            Box::new(TraceStep::new("a", t.clone())),
            Box::new(TraceStep::new("b", t.clone()).failing_action()),
        ]);

        engine.execute(&mut saga).await.unwrap();

        assert_eq!(
            sink.event_types(),
            vec![
                "SagaStarted",
                "StepStarted",
                "StepCompleted",
                "StepStarted",
                "StepFailed",
                "CompensationStarted",
                "CompensationStepCompleted",
                "SagaCompensated",
            ]
        );
    }

    #[tokio::test]
    async fn test_event_stream_on_completed_run() {
        let sink = RecordingSink::new();
        let engine = SagaEngine::with_sink(sink.clone());
        let mut saga = Saga::with_steps(vec![Box::new(TraceStep::new("a", trace()))]);

        engine.execute(&mut saga).await.unwrap();

        assert_eq!(
            sink.event_types(),
            vec!["SagaStarted", "StepStarted", "StepCompleted", "SagaCompleted"]
        );
    }

    #[tokio::test]
    async fn test_independent_sagas_share_one_engine() {
        let engine = Arc::new(SagaEngine::new());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let engine = engine.clone();
            let t = trace();
            handles.push(tokio::spawn(async move {
                let mut saga = Saga::with_steps(vec![
                    Box::new(TraceStep::new("a", t.clone())),
                    Box::new(TraceStep::new("b", t.clone())),
                ]);
                let outcome = engine.execute(&mut saga).await.unwrap();
                (outcome.is_completed(), t.lock().unwrap().clone())
            }));
        }

        for handle in handles {
            let (completed, steps) = handle.await.unwrap();
            assert!(completed);
            assert_eq!(steps, vec!["do:a", "do:b"]);
        }
    }
}
