//! Idempotent saga execution.

use saga::{EventSink, Saga, SagaEngine, SagaError};

use crate::record::OutcomeRecord;
use crate::store::{IdempotencyKey, IdempotencyStore};

/// Deduplicates saga execution by idempotency key.
///
/// A key seen before returns the cached [`OutcomeRecord`] verbatim without
/// touching the saga; a new key runs the saga to its terminal outcome and
/// caches the record, including failure outcomes. Usage errors such as
/// [`SagaError::AlreadyExecuted`] propagate and are never cached.
///
/// Two racing requests with the same key may both execute before either
/// caches; the first completed write wins. A store with reservation semantics
/// would close that window.
pub struct IdempotentExecutor<St, E>
where
    St: IdempotencyStore,
    E: EventSink,
{
    store: St,
    engine: SagaEngine<E>,
}

impl<St, E> IdempotentExecutor<St, E>
where
    St: IdempotencyStore,
    E: EventSink,
{
    /// Creates an executor over the given store and engine.
    pub fn new(store: St, engine: SagaEngine<E>) -> Self {
        Self { store, engine }
    }

    /// Executes the saga unless the key has been seen before.
    #[tracing::instrument(skip(self, saga), fields(key = %key))]
    pub async fn execute(
        &self,
        key: IdempotencyKey,
        saga: &mut Saga,
    ) -> Result<OutcomeRecord, SagaError> {
        if let Some(record) = self.store.get(&key).await {
            metrics::counter!("idempotent_hits_total").increment(1);
            tracing::info!(%key, "duplicate request, returning cached outcome");
            return Ok(record);
        }

        let outcome = self.engine.execute(saga).await?;
        let record = OutcomeRecord::from(&outcome);
        self.store.put(key, record.clone()).await;
        Ok(record)
    }
}
