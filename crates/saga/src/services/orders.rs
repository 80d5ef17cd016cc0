//! Order service trait, in-memory implementation, and saga step.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::StepError;
use crate::order_fulfillment::STEP_CONFIRM_ORDER;
use crate::step::Step;

/// Errors reported by an order adapter.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order could not be confirmed.
    #[error("confirmation rejected for order {0}")]
    Rejected(u32),

    /// The order is already confirmed.
    #[error("order {0} already confirmed")]
    AlreadyConfirmed(u32),
}

/// Trait for order confirmation operations.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Confirms the order.
    async fn confirm(&self, order_id: u32) -> Result<(), OrderError>;

    /// Cancels a previously confirmed order.
    async fn cancel(&self, order_id: u32) -> Result<(), OrderError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<u32, String>,
    fail_on_confirm: bool,
}

/// In-memory order service for testing and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderService {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderService {
    /// Creates a new in-memory order service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to reject the next confirm call.
    pub fn set_fail_on_confirm(&self, fail: bool) {
        self.state.write().unwrap().fail_on_confirm = fail;
    }

    /// Returns the number of confirmed orders.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns true if the order is confirmed.
    pub fn has_order(&self, order_id: u32) -> bool {
        self.state.read().unwrap().orders.contains_key(&order_id)
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn confirm(&self, order_id: u32) -> Result<(), OrderError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_confirm {
            return Err(OrderError::Rejected(order_id));
        }
        if state.orders.contains_key(&order_id) {
            return Err(OrderError::AlreadyConfirmed(order_id));
        }

        state.orders.insert(order_id, "confirmed".to_string());
        Ok(())
    }

    async fn cancel(&self, order_id: u32) -> Result<(), OrderError> {
        let mut state = self.state.write().unwrap();
        state.orders.remove(&order_id);
        Ok(())
    }
}

/// Saga step confirming an order, with cancellation as compensation.
pub struct ConfirmOrder<O: OrderService> {
    orders: O,
    order_id: u32,
}

impl<O: OrderService> ConfirmOrder<O> {
    /// Creates the step for the given order.
    pub fn new(orders: O, order_id: u32) -> Self {
        Self { orders, order_id }
    }
}

#[async_trait]
impl<O: OrderService> Step for ConfirmOrder<O> {
    fn name(&self) -> &str {
        STEP_CONFIRM_ORDER
    }

    async fn action(&self) -> Result<(), StepError> {
        self.orders.confirm(self.order_id).await?;
        Ok(())
    }

    async fn compensation(&self) -> Result<(), StepError> {
        self.orders.cancel(self.order_id).await?;
        Ok(())
    }
}
