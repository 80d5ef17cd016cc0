//! Resource adapter traits, in-memory implementations, and the step structs
//! that bind them into a saga.

pub mod inventory;
pub mod orders;
pub mod payment;

pub use inventory::{DeductInventory, InMemoryInventoryService, InventoryError, InventoryService};
pub use orders::{ConfirmOrder, InMemoryOrderService, OrderError, OrderService};
pub use payment::{InMemoryPaymentService, PaymentError, PaymentService, ProcessPayment};
