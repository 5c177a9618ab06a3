//! Kitchen display WebSocket protocol
//!
//! Server → Display only. Envelopes are `{"event": "...", "order": {...}}`.

use serde::{Deserialize, Serialize};

use crate::order::{OrderStatusView, OrderView};

/// Server → kitchen display push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum KitchenEvent {
    /// Order committed; carries the full snapshot
    NewOrder { order: Box<OrderView> },
    /// Status moved forward
    OrderUpdate { order: OrderStatusView },
}

impl KitchenEvent {
    pub fn new_order(order: OrderView) -> Self {
        Self::NewOrder {
            order: Box::new(order),
        }
    }

    pub fn order_update(order: &OrderView) -> Self {
        Self::OrderUpdate {
            order: OrderStatusView::from(order),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NewOrder { .. } => "new_order",
            Self::OrderUpdate { .. } => "order_update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus;
    use uuid::Uuid;

    #[test]
    fn update_envelope_shape() {
        let id = Uuid::new_v4();
        let event = KitchenEvent::OrderUpdate {
            order: OrderStatusView {
                id,
                status: OrderStatus::Ready,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "order_update");
        assert_eq!(json["order"]["status"], "READY");
        assert_eq!(json["order"]["id"], id.to_string());
        assert_eq!(event.name(), "order_update");
    }
}
