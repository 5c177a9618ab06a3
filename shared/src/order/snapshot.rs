//! Frozen order records
//!
//! A [`LineSnapshot`] captures names and prices at purchase time. It is
//! persisted verbatim and never recomputed from the live catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::OrderStatus;

/// Modifier option as it was priced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierSnapshot {
    pub option_id: Uuid,
    pub group_name: String,
    pub name: String,
    /// Price delta in minor units
    pub price_delta: i64,
}

/// One purchased line, frozen at purchase time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSnapshot {
    pub item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    /// Item base price (minor units)
    pub base_price: i64,
    /// Base price plus modifier deltas
    pub unit_price: i64,
    #[serde(default)]
    pub modifiers: Vec<ModifierSnapshot>,
    /// `unit_price * quantity`
    pub line_total: i64,
}

/// Full order as stored and as broadcast on `new_order`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub ticket_number: i32,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub items: Vec<LineSnapshot>,
    /// UTC calendar date the ticket number belongs to
    pub business_day: NaiveDate,
    /// Creation time (Unix millis)
    pub created_at: i64,
    /// Last status change (Unix millis)
    pub updated_at: i64,
}

/// `{id, status}` pair carried by `order_update`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusView {
    pub id: Uuid,
    pub status: OrderStatus,
}

impl From<&OrderView> for OrderStatusView {
    fn from(order: &OrderView) -> Self {
        Self {
            id: order.id,
            status: order.status,
        }
    }
}
