//! Order endpoint payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::OrderStatus;

/// Upper bound for a single line quantity
pub const MAX_LINE_QUANTITY: i32 = 999;
/// Upper bound for lines in one cart
pub const MAX_CART_LINES: usize = 100;
/// Upper bound for customer name / table label length (chars)
pub const MAX_NAME_LEN: usize = 100;

/// Selected modifier option in a cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartModifier {
    pub option_id: Uuid,
}

/// One cart line as submitted by the storefront
///
/// Client-side prices are never part of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub qty: i32,
    #[serde(default)]
    pub modifiers: Vec<CartModifier>,
}

impl CartLine {
    pub fn new(id: Uuid, qty: i32) -> Self {
        Self {
            id,
            qty,
            modifiers: Vec::new(),
        }
    }

    pub fn with_option(mut self, option_id: Uuid) -> Self {
        self.modifiers.push(CartModifier { option_id });
        self
    }
}

/// POST /api/v1/store/orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    #[serde(default)]
    pub table_number: Option<String>,
    pub items: Vec<CartLine>,
    /// Fail on any unresolvable line instead of dropping it
    #[serde(default)]
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub id: Uuid,
    pub ticket_number: i32,
    pub status: OrderStatus,
    pub message: String,
    pub total_amount: i64,
}

/// PUT /api/v1/kitchen/orders/{id}/status
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}
