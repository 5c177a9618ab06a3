//! Cart Price Calculator
//!
//! Pure function over an already-fetched catalog slice. Client prices never
//! enter the computation: the cart carries ids and quantities only.
//!
//! # Calculation Steps
//! 1. Resolve the item (unknown or unavailable: drop in lenient mode, reject in strict)
//! 2. Resolve each selected option against the item's own groups
//!    (foreign option: ignore in lenient mode, reject in strict)
//! 3. Check selection counts of every group of the item
//! 4. `unit = base + Σ deltas`, `line = unit × qty`, `total = Σ lines`
//!
//! All amounts are integer minor units; every step is overflow-checked.

use std::collections::{HashMap, HashSet};

use shared::models::{MenuItem, ModifierGroup, ModifierOption};
use shared::order::{CartLine, LineSnapshot, MAX_CART_LINES, MAX_LINE_QUANTITY, ModifierSnapshot};
use uuid::Uuid;

use super::{PricingError, PricingMode};

/// Result of pricing a cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    /// Sum of all line totals
    pub total: i64,
    /// Frozen lines, in cart order
    pub lines: Vec<LineSnapshot>,
    /// Cart lines dropped as unresolvable (lenient mode only)
    pub dropped: usize,
}

pub fn price_lines(
    cart: &[CartLine],
    catalog: &HashMap<Uuid, MenuItem>,
    mode: PricingMode,
) -> Result<PricedCart, PricingError> {
    if cart.len() > MAX_CART_LINES {
        return Err(PricingError::TooManyLines(cart.len()));
    }

    let mut lines = Vec::with_capacity(cart.len());
    let mut dropped = 0;
    let mut total: i64 = 0;

    for line in cart {
        if !(1..=MAX_LINE_QUANTITY).contains(&line.qty) {
            return Err(PricingError::InvalidQuantity {
                item_id: line.id,
                qty: line.qty,
            });
        }

        let item = match catalog.get(&line.id) {
            Some(item) if item.is_available => item,
            found => {
                if mode == PricingMode::Strict {
                    return Err(match found {
                        Some(_) => PricingError::UnavailableItem(line.id),
                        None => PricingError::UnknownItem(line.id),
                    });
                }
                tracing::debug!(item_id = %line.id, "Dropping unresolvable cart line");
                dropped += 1;
                continue;
            }
        };

        let snapshot = price_line(line, item, mode)?;
        total = total
            .checked_add(snapshot.line_total)
            .ok_or(PricingError::Overflow)?;
        lines.push(snapshot);
    }

    if lines.is_empty() {
        return Err(PricingError::Empty);
    }

    Ok(PricedCart {
        total,
        lines,
        dropped,
    })
}

fn price_line(line: &CartLine, item: &MenuItem, mode: PricingMode) -> Result<LineSnapshot, PricingError> {
    let options: HashMap<Uuid, (&ModifierGroup, &ModifierOption)> = item
        .modifier_groups
        .iter()
        .flat_map(|g| g.options.iter().map(move |o| (o.id, (g, o))))
        .collect();

    let mut seen = HashSet::new();
    let mut selected: Vec<(&ModifierGroup, &ModifierOption)> = Vec::new();
    for m in &line.modifiers {
        // Same option twice counts once
        if !seen.insert(m.option_id) {
            continue;
        }
        match options.get(&m.option_id) {
            Some(pair) => selected.push(*pair),
            None if mode == PricingMode::Strict => {
                return Err(PricingError::UnknownOption {
                    item_id: item.id,
                    option_id: m.option_id,
                });
            }
            None => {
                tracing::debug!(item_id = %item.id, option_id = %m.option_id, "Ignoring foreign modifier option");
            }
        }
    }

    for group in &item.modifier_groups {
        let count = selected.iter().filter(|(g, _)| g.id == group.id).count();
        if !group.accepts(count) {
            return Err(PricingError::SelectionCount {
                item_id: item.id,
                group: group.name.clone(),
                count,
                min: group.min_selection,
                max: group.max_selection,
            });
        }
    }

    let mut unit_price = item.price;
    let mut modifiers = Vec::with_capacity(selected.len());
    for (group, option) in selected {
        unit_price = unit_price
            .checked_add(option.price_adjustment)
            .ok_or(PricingError::Overflow)?;
        modifiers.push(ModifierSnapshot {
            option_id: option.id,
            group_name: group.name.clone(),
            name: option.name.clone(),
            price_delta: option.price_adjustment,
        });
    }

    if unit_price < 0 {
        return Err(PricingError::NegativeUnitPrice(item.id));
    }

    let line_total = unit_price
        .checked_mul(i64::from(line.qty))
        .ok_or(PricingError::Overflow)?;

    Ok(LineSnapshot {
        item_id: item.id,
        name: item.name.clone(),
        quantity: line.qty,
        base_price: item.price,
        unit_price,
        modifiers,
        line_total,
    })
}
