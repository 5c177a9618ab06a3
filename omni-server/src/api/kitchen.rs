//! Kitchen display endpoints (staff identity required)

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::order::{OrderView, UpdateStatusRequest};
use uuid::Uuid;

use super::ApiResult;
use crate::orders::order_not_found;
use crate::state::AppState;
use crate::tenant::TenantContext;

/// GET /api/v1/kitchen/orders
pub async fn list_active_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> ApiResult<Vec<OrderView>> {
    ctx.require_staff()?;
    let orders = state.pipeline.list_active(&ctx.partition).await?;
    Ok(Json(orders))
}

/// PUT /api/v1/kitchen/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<OrderView> {
    let identity = ctx.require_staff()?;
    let id = Uuid::parse_str(&id).map_err(|_| order_not_found(&id))?;
    tracing::debug!(subject = %identity.subject, order_id = %id, status = %req.status, "Status change requested");
    let order = state
        .pipeline
        .update_status(&ctx.partition, id, req.status)
        .await?;
    Ok(Json(order))
}
