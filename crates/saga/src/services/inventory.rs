//! Inventory service trait, in-memory implementation, and saga step.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::StepError;
use crate::order_fulfillment::STEP_DEDUCT_INVENTORY;
use crate::step::Step;

/// Errors reported by an inventory adapter.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No stock left to deduct.
    #[error("insufficient stock for product {0}")]
    InsufficientStock(u32),

    /// The product is not tracked.
    #[error("unknown product {0}")]
    UnknownProduct(u32),

    /// The backing service could not be reached.
    #[error("inventory service unavailable")]
    Unavailable,
}

/// Trait for inventory management operations.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Deducts one unit of stock for the product.
    async fn deduct(&self, product_id: u32) -> Result<(), InventoryError>;

    /// Restores one unit of stock for the product.
    async fn restore(&self, product_id: u32) -> Result<(), InventoryError>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    stock: HashMap<u32, u32>,
    fail_on_deduct: bool,
    fail_on_restore: bool,
}

/// In-memory inventory service for testing and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryService {
    /// Creates an empty in-memory inventory service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds stock for a product, returning self for chaining.
    pub fn with_stock(self, product_id: u32, quantity: u32) -> Self {
        self.state.write().unwrap().stock.insert(product_id, quantity);
        self
    }

    /// Configures the service to fail deduct calls.
    pub fn set_fail_on_deduct(&self, fail: bool) {
        self.state.write().unwrap().fail_on_deduct = fail;
    }

    /// Configures the service to fail restore calls.
    pub fn set_fail_on_restore(&self, fail: bool) {
        self.state.write().unwrap().fail_on_restore = fail;
    }

    /// Returns the stock level for a product, if tracked.
    pub fn stock_of(&self, product_id: u32) -> Option<u32> {
        self.state.read().unwrap().stock.get(&product_id).copied()
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn deduct(&self, product_id: u32) -> Result<(), InventoryError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_deduct {
            return Err(InventoryError::Unavailable);
        }

        let stock = state
            .stock
            .get_mut(&product_id)
            .ok_or(InventoryError::UnknownProduct(product_id))?;
        if *stock == 0 {
            return Err(InventoryError::InsufficientStock(product_id));
        }
        *stock -= 1;
        Ok(())
    }

    async fn restore(&self, product_id: u32) -> Result<(), InventoryError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_restore {
            return Err(InventoryError::Unavailable);
        }

        let stock = state
            .stock
            .get_mut(&product_id)
            .ok_or(InventoryError::UnknownProduct(product_id))?;
        *stock += 1;
        Ok(())
    }
}

/// Saga step deducting one unit of stock, with restore as compensation.
///
/// The inventory handle is injected at construction, so its ownership is
/// visible at the call site.
pub struct DeductInventory<I: InventoryService> {
    inventory: I,
    product_id: u32,
}

impl<I: InventoryService> DeductInventory<I> {
    /// Creates the step for the given product.
    pub fn new(inventory: I, product_id: u32) -> Self {
        Self {
            inventory,
            product_id,
        }
    }
}

#[async_trait]
impl<I: InventoryService> Step for DeductInventory<I> {
    fn name(&self) -> &str {
        STEP_DEDUCT_INVENTORY
    }

    async fn action(&self) -> Result<(), StepError> {
        self.inventory.deduct(self.product_id).await?;
        Ok(())
    }

    async fn compensation(&self) -> Result<(), StepError> {
        self.inventory.restore(self.product_id).await?;
        Ok(())
    }
}
