//! Pricing Engine
//!
//! Recomputes authoritative line and grand totals from the partition's
//! catalog. Referenced items are fetched in one bulk query, then priced by
//! [`price_lines`].

mod calculator;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::order::CartLine;
use uuid::Uuid;

use crate::db::CatalogRepository;
use crate::error::ServiceResult;
use crate::tenant::Partition;

pub use calculator::{PricedCart, price_lines};

/// How unresolvable cart content is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PricingMode {
    /// Drop unknown or unavailable items, ignore options foreign to the item
    #[default]
    Lenient,
    /// Reject any unresolvable line or option
    Strict,
}

impl PricingMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("order cannot be empty")]
    Empty,
    #[error("cart has too many lines: {0}")]
    TooManyLines(usize),
    #[error("invalid quantity {qty} for item {item_id}")]
    InvalidQuantity { item_id: Uuid, qty: i32 },
    #[error("unknown menu item {0}")]
    UnknownItem(Uuid),
    #[error("menu item {0} is not available")]
    UnavailableItem(Uuid),
    #[error("modifier option {option_id} does not belong to item {item_id}")]
    UnknownOption { item_id: Uuid, option_id: Uuid },
    #[error("{group}: {count} selected, expected {min}..={max}")]
    SelectionCount {
        item_id: Uuid,
        group: String,
        count: usize,
        min: i32,
        max: i32,
    },
    #[error("unit price of item {0} is negative")]
    NegativeUnitPrice(Uuid),
    #[error("order amount overflow")]
    Overflow,
}

impl From<PricingError> for AppError {
    fn from(e: PricingError) -> Self {
        let message = e.to_string();
        match e {
            PricingError::Empty => AppError::with_message(ErrorCode::OrderEmpty, message),
            PricingError::TooManyLines(n) => {
                AppError::with_message(ErrorCode::InvalidRequest, message).with_detail("lines", n)
            }
            PricingError::InvalidQuantity { item_id, qty } => {
                AppError::with_message(ErrorCode::InvalidQuantity, message)
                    .with_detail("item_id", item_id.to_string())
                    .with_detail("qty", qty)
            }
            PricingError::UnknownItem(id) => AppError::with_message(ErrorCode::MenuItemNotFound, message)
                .with_detail("item_id", id.to_string()),
            PricingError::UnavailableItem(id) => {
                AppError::with_message(ErrorCode::MenuItemUnavailable, message)
                    .with_detail("item_id", id.to_string())
            }
            PricingError::UnknownOption { item_id, option_id } => {
                AppError::with_message(ErrorCode::ModifierOptionInvalid, message)
                    .with_detail("item_id", item_id.to_string())
                    .with_detail("option_id", option_id.to_string())
            }
            PricingError::SelectionCount { item_id, group, .. } => {
                AppError::with_message(ErrorCode::ModifierSelectionInvalid, message)
                    .with_detail("item_id", item_id.to_string())
                    .with_detail("group", group)
            }
            PricingError::NegativeUnitPrice(_) | PricingError::Overflow => {
                AppError::with_message(ErrorCode::AmountOverflow, message)
            }
        }
    }
}

#[derive(Clone)]
pub struct PricingEngine {
    catalog: Arc<dyn CatalogRepository>,
    default_mode: PricingMode,
}

impl PricingEngine {
    pub fn new(catalog: Arc<dyn CatalogRepository>, default_mode: PricingMode) -> Self {
        Self {
            catalog,
            default_mode,
        }
    }

    /// Price `cart` against the partition's current catalog
    pub async fn price(
        &self,
        partition: &Partition,
        cart: &[CartLine],
        mode: Option<PricingMode>,
    ) -> ServiceResult<PricedCart> {
        let mode = mode.unwrap_or(self.default_mode);
        if cart.is_empty() {
            return Err(AppError::from(PricingError::Empty).into());
        }

        let ids: Vec<Uuid> = cart
            .iter()
            .map(|l| l.id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let items = self.catalog.find_items(partition, &ids).await?;
        let catalog: HashMap<Uuid, _> = items.into_iter().map(|i| (i.id, i)).collect();

        let priced = price_lines(cart, &catalog, mode).map_err(AppError::from)?;
        if priced.dropped > 0 {
            tracing::info!(
                partition = %partition,
                dropped = priced.dropped,
                "Cart lines dropped during pricing"
            );
        }
        Ok(priced)
    }
}
