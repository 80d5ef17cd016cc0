//! Saga orchestrator with reverse-order compensation.
//!
//! A saga is an ordered sequence of forward operations against independent
//! resources. The engine executes them sequentially, recording each commit in
//! an execution ledger; on the first failure it unwinds the ledger tail-first
//! through the registered compensations and reports a terminal [`Outcome`].
//!
//! The engine performs no I/O of its own beyond invoking the steps: tracing
//! and metrics go through the host's subscribers, and step-transition events
//! are routed through a caller-supplied [`EventSink`].

pub mod engine;
pub mod error;
pub mod events;
pub mod id;
pub mod ledger;
pub mod order_fulfillment;
pub mod outcome;
pub mod services;
pub mod state;
pub mod step;

pub use engine::{Saga, SagaEngine};
pub use error::{SagaError, StepError};
pub use events::{EventSink, NullSink, RecordingSink, SagaEvent};
pub use id::SagaId;
pub use ledger::Ledger;
pub use order_fulfillment::order_fulfillment_saga;
pub use outcome::Outcome;
pub use services::{
    ConfirmOrder, DeductInventory, InMemoryInventoryService, InMemoryOrderService,
    InMemoryPaymentService, InventoryService, OrderService, PaymentService, ProcessPayment,
};
pub use state::SagaState;
pub use step::Step;
