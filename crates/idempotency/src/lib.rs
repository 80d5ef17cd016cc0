//! Idempotency-key deduplication in front of the saga engine.
//!
//! A host process composing this layer with [`saga`] forwards only
//! genuinely-new requests to the engine; retried requests carrying a
//! previously seen key receive the cached [`OutcomeRecord`] verbatim. The
//! store is an explicit keyed map with a defined concurrency discipline, not
//! process-global state.

pub mod executor;
pub mod record;
pub mod store;

pub use executor::IdempotentExecutor;
pub use record::OutcomeRecord;
pub use store::{IdempotencyKey, IdempotencyStore, InMemoryIdempotencyStore};
