//! Keyed outcome store for request deduplication.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::record::OutcomeRecord;

/// Client-supplied token identifying one logical request.
///
/// Retries of the same request carry the same key; the executor uses it to
/// return the cached outcome instead of re-running the saga.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Creates a key from the client's token.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdempotencyKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for the keyed outcome store behind the executor.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Returns the cached record for the key, if any.
    async fn get(&self, key: &IdempotencyKey) -> Option<OutcomeRecord>;

    /// Stores the record for the key.
    async fn put(&self, key: IdempotencyKey, record: OutcomeRecord);
}

/// In-memory store: a single-writer map behind a mutex.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdempotencyStore {
    records: Arc<Mutex<HashMap<IdempotencyKey, OutcomeRecord>>>,
}

impl InMemoryIdempotencyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Returns true if no records are cached.
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn get(&self, key: &IdempotencyKey) -> Option<OutcomeRecord> {
        self.records.lock().unwrap().get(key).cloned()
    }

    async fn put(&self, key: IdempotencyKey, record: OutcomeRecord) {
        self.records.lock().unwrap().insert(key, record);
    }
}
