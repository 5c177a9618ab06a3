//! Order types shared by the storefront, the kitchen display and the server
//!
//! - Requests: cart payloads submitted by customers
//! - Snapshots: immutable purchase-time records
//! - Status: the lifecycle state machine

pub mod request;
pub mod snapshot;
pub mod status;

// Re-exports
pub use request::{
    CartLine, CartModifier, CreateOrderRequest, CreateOrderResponse, MAX_CART_LINES,
    MAX_LINE_QUANTITY, MAX_NAME_LEN, UpdateStatusRequest,
};
pub use snapshot::{LineSnapshot, ModifierSnapshot, OrderStatusView, OrderView};
pub use status::{OrderStatus, TransitionError, UnknownStatus};
