//! Payment service trait, in-memory implementation, and saga step.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::StepError;
use crate::order_fulfillment::STEP_PROCESS_PAYMENT;
use crate::step::Step;

/// Errors reported by a payment adapter.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The charge was declined.
    #[error("payment declined for order {0}")]
    Declined(u32),

    /// A payment already exists for the order.
    #[error("duplicate payment for order {0}")]
    Duplicate(u32),

    /// The refund was rejected.
    #[error("refund rejected for order {0}")]
    RefundRejected(u32),
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Processes the payment for an order.
    async fn process(&self, order_id: u32) -> Result<(), PaymentError>;

    /// Refunds a previously processed payment.
    async fn refund(&self, order_id: u32) -> Result<(), PaymentError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<u32, String>,
    fail_on_process: bool,
    fail_on_refund: bool,
}

/// In-memory payment service for testing and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline the next process call.
    pub fn set_fail_on_process(&self, fail: bool) {
        self.state.write().unwrap().fail_on_process = fail;
    }

    /// Configures the service to reject refund calls.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Returns the number of processed payments.
    pub fn payment_count(&self) -> usize {
        self.state.read().unwrap().payments.len()
    }

    /// Returns true if a payment exists for the order.
    pub fn has_payment(&self, order_id: u32) -> bool {
        self.state.read().unwrap().payments.contains_key(&order_id)
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn process(&self, order_id: u32) -> Result<(), PaymentError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_process {
            return Err(PaymentError::Declined(order_id));
        }
        if state.payments.contains_key(&order_id) {
            return Err(PaymentError::Duplicate(order_id));
        }

        state.payments.insert(order_id, "processed".to_string());
        Ok(())
    }

    async fn refund(&self, order_id: u32) -> Result<(), PaymentError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_refund {
            return Err(PaymentError::RefundRejected(order_id));
        }

        state.payments.remove(&order_id);
        Ok(())
    }
}

/// Saga step charging an order, with refund as compensation.
pub struct ProcessPayment<P: PaymentService> {
    payment: P,
    order_id: u32,
}

impl<P: PaymentService> ProcessPayment<P> {
    /// Creates the step for the given order.
    pub fn new(payment: P, order_id: u32) -> Self {
        Self { payment, order_id }
    }
}

#[async_trait]
impl<P: PaymentService> Step for ProcessPayment<P> {
    fn name(&self) -> &str {
        STEP_PROCESS_PAYMENT
    }

    async fn action(&self) -> Result<(), StepError> {
        self.payment.process(self.order_id).await?;
        Ok(())
    }

    async fn compensation(&self) -> Result<(), StepError> {
        self.payment.refund(self.order_id).await?;
        Ok(())
    }
}
