//! Order fulfillment
//!
//! - **ticket**: per-tenant, per-day ticket numbering
//! - **pipeline**: create / status change / read, plus kitchen broadcasts
//!
//! # Data Flow
//!
//! ```text
//! POST /store/orders ─► rate governor ─► tenant resolver
//!        │
//!        ▼
//! OrderPipeline::create
//!   1. validate customer fields
//!   2. PricingEngine::price   (bulk catalog fetch, authoritative totals)
//!   3. TicketSequencer        (counter + insert in one transaction)
//!   4. KitchenHub::publish    (new_order, best effort)
//! ```

pub mod pipeline;
pub mod ticket;

pub use pipeline::{ORDER_RECEIVED, OrderPipeline, order_not_found};
pub use ticket::{TicketSequencer, business_day};
