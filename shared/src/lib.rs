//! Shared types for OmniOrder
//!
//! Common types used by the server and its clients: error codes,
//! catalog and tenant models, order payloads and the kitchen protocol.

pub mod error;
pub mod kitchen;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
