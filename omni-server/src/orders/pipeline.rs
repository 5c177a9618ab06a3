//! Order Pipeline: create, status changes, reads

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::kitchen::KitchenEvent;
use shared::order::{
    CreateOrderRequest, CreateOrderResponse, MAX_NAME_LEN, OrderStatus, OrderView,
};
use shared::util::now_millis;
use uuid::Uuid;

use super::ticket::{TicketSequencer, business_day};
use crate::db::{NewOrder, OrderRepository};
use crate::error::ServiceResult;
use crate::live::KitchenHub;
use crate::pricing::{PricingEngine, PricingMode};
use crate::tenant::Partition;

/// Compare-and-set attempts before a status change gives up
const MAX_STATUS_ATTEMPTS: usize = 3;

pub const ORDER_RECEIVED: &str = "Order received";

#[derive(Clone)]
pub struct OrderPipeline {
    orders: Arc<dyn OrderRepository>,
    pricing: PricingEngine,
    tickets: TicketSequencer,
    hub: KitchenHub,
}

impl OrderPipeline {
    pub fn new(orders: Arc<dyn OrderRepository>, pricing: PricingEngine, hub: KitchenHub) -> Self {
        Self {
            tickets: TicketSequencer::new(orders.clone()),
            orders,
            pricing,
            hub,
        }
    }

    /// Price, number, persist and announce a new order.
    ///
    /// The order is committed before `new_order` is published; a publish
    /// problem never undoes the order.
    pub async fn create(
        &self,
        partition: &Partition,
        req: CreateOrderRequest,
    ) -> ServiceResult<CreateOrderResponse> {
        let customer_name = required_text("customerName", &req.customer_name)?;
        let table_number = match req.table_number.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Some(required_text("tableNumber", t)?),
            _ => None,
        };

        let mode = req.strict.map(PricingMode::from_strict);
        let priced = self.pricing.price(partition, &req.items, mode).await?;

        let created_at = now_millis();
        let order = self
            .tickets
            .assign_and_insert(
                partition,
                NewOrder {
                    id: Uuid::new_v4(),
                    customer_name,
                    table_number,
                    total_amount: priced.total,
                    items: priced.lines,
                    business_day: business_day(created_at),
                    created_at,
                },
            )
            .await?;

        tracing::info!(
            partition = %partition,
            order_id = %order.id,
            ticket = order.ticket_number,
            total = order.total_amount,
            "Order created"
        );

        let response = CreateOrderResponse {
            id: order.id,
            ticket_number: order.ticket_number,
            status: order.status,
            message: ORDER_RECEIVED.to_string(),
            total_amount: order.total_amount,
        };
        self.hub.publish(partition, KitchenEvent::new_order(order));
        Ok(response)
    }

    /// Move an order forward along the status machine.
    ///
    /// Applied as compare-and-set on the observed status; losing a race
    /// re-validates against the fresh status.
    pub async fn update_status(
        &self,
        partition: &Partition,
        id: Uuid,
        next: OrderStatus,
    ) -> ServiceResult<OrderView> {
        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let current = self.get_status(partition, id).await?;
            current.status.transition_to(next).map_err(AppError::from)?;

            if let Some(updated) = self
                .orders
                .compare_and_set_status(partition, id, current.status, next)
                .await?
            {
                tracing::info!(
                    partition = %partition,
                    order_id = %id,
                    from = %current.status,
                    to = %next,
                    "Order status changed"
                );
                self.hub
                    .publish(partition, KitchenEvent::order_update(&updated));
                return Ok(updated);
            }
            tracing::debug!(order_id = %id, attempt, "Order status changed underneath, retrying");
        }

        Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Order is being updated concurrently, try again",
        )
        .into())
    }

    pub async fn get_status(&self, partition: &Partition, id: Uuid) -> ServiceResult<OrderView> {
        self.orders
            .find(partition, id)
            .await?
            .ok_or_else(|| order_not_found(id).into())
    }

    /// Non-completed orders, oldest first
    pub async fn list_active(&self, partition: &Partition) -> ServiceResult<Vec<OrderView>> {
        Ok(self.orders.list_active(partition).await?)
    }
}

pub fn order_not_found(id: impl ToString) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id.to_string())
}

fn required_text(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} is required"))
                .with_detail("field", field),
        );
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} is longer than {MAX_NAME_LEN} characters"),
        )
        .with_detail("field", field));
    }
    Ok(value.to_string())
}
