//! omni-server: multi-tenant ordering core
//!
//! Resolves a tenant per request, prices carts against the tenant's catalog,
//! assigns per-day ticket numbers, drives the order status machine and pushes
//! kitchen events to connected displays.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod logger;
pub mod orders;
pub mod pricing;
pub mod state;
pub mod tenant;

pub use config::Config;
pub use state::AppState;
