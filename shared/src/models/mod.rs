//! Data models
//!
//! Shared between omni-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUIDs; all money is `i64` cents.

pub mod menu;
pub mod tenant;

// Re-exports
pub use menu::*;
pub use tenant::*;
