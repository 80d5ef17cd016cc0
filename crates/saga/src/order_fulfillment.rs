//! Order fulfillment saga constants and factory.

use crate::engine::Saga;
use crate::services::{
    ConfirmOrder, DeductInventory, InventoryService, OrderService, PaymentService, ProcessPayment,
};

/// Step name: deduct stock for the ordered product.
pub const STEP_DEDUCT_INVENTORY: &str = "deduct_inventory";

/// Step name: process payment for the order.
pub const STEP_PROCESS_PAYMENT: &str = "process_payment";

/// Step name: confirm the order.
pub const STEP_CONFIRM_ORDER: &str = "confirm_order";

/// Builds the three-step order fulfillment saga.
///
/// Each resource handle is injected explicitly, so connection ownership is
/// visible here rather than captured implicitly by the steps.
pub fn order_fulfillment_saga<I, P, O>(
    inventory: I,
    payment: P,
    orders: O,
    product_id: u32,
    order_id: u32,
) -> Saga
where
    I: InventoryService + 'static,
    P: PaymentService + 'static,
    O: OrderService + 'static,
{
    Saga::with_steps(vec![
        Box::new(DeductInventory::new(inventory, product_id)),
        Box::new(ProcessPayment::new(payment, order_id)),
        Box::new(ConfirmOrder::new(orders, order_id)),
    ])
}
