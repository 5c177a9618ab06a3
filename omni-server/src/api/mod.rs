//! API routes for omni-server
//!
//! - `/api/v1/store/*`: public storefront (tenant resolved per request)
//! - `/api/v1/kitchen/*`: kitchen display, staff identity required
//! - `/api/v1/ws/kitchen`: realtime kitchen channel
//! - `/api/v1/sys/*`: sandbox sessions and tenant provisioning

pub mod health;
pub mod kitchen;
pub mod store;
pub mod sys;
pub mod ws;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use http::{HeaderName, HeaderValue, Method, header};
use shared::error::AppError;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::rate_limit::order_rate_limit;
use crate::state::AppState;
use crate::tenant::resolve_tenant;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let rate_limited = middleware::from_fn_with_state(state.clone(), order_rate_limit);

    // Tenant-scoped routes: TenantContext resolved from Host + bearer token
    let tenant_scoped = Router::new()
        .route("/api/v1/store/config", get(store::get_config))
        .route("/api/v1/store/menu", get(store::get_menu))
        .route(
            "/api/v1/store/orders",
            post(store::create_order).route_layer(rate_limited.clone()),
        )
        .route("/api/v1/store/orders/{id}", get(store::get_order_status))
        .route("/api/v1/kitchen/orders", get(kitchen::list_active_orders))
        .route(
            "/api/v1/kitchen/orders/{id}/status",
            put(kitchen::update_order_status),
        )
        .route("/api/v1/sys/reset-demo", post(sys::reset_demo))
        .route("/api/v1/sys/provision", post(sys::provision))
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_tenant));

    // Public routes (no tenant)
    let public = Router::new()
        .route("/api/health", get(health::health_check))
        .route(
            "/api/v1/sys/generate-demo-session",
            post(sys::generate_demo_session).route_layer(rate_limited),
        )
        // Resolves its own tenant so failures become close codes
        .route("/api/v1/ws/kitchen", get(ws::handle_kitchen_ws));

    let cors = cors_layer(&state.config.cors_allow_origins);

    Router::new()
        .merge(tenant_scoped)
        .merge(public)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers(Any)
}
