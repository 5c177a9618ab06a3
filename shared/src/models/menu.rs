//! Catalog Model
//!
//! Per-partition catalog entities. Prices are integer minor units.
//! A [`MenuItem`] owns its [`ModifierGroup`]s, a group owns its
//! [`ModifierOption`]s.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Display order, ascending
    pub rank: i32,
}

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    /// Base price in cents
    pub price: i64,
    pub image_url: Option<String>,
    pub is_available: bool,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub modifier_groups: Vec<ModifierGroup>,
}

/// Modifier group entity (e.g. "Add-ons", "Preparation")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ModifierGroup {
    pub id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub min_selection: i32,
    pub max_selection: i32,

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub options: Vec<ModifierOption>,
}

impl ModifierGroup {
    /// Whether `count` selected options satisfy this group
    pub fn accepts(&self, count: usize) -> bool {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        count >= i64::from(self.min_selection) && count <= i64::from(self.max_selection)
    }
}

/// Modifier option entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ModifierOption {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    /// Signed price delta in cents
    pub price_adjustment: i64,
}

/// Storefront menu section: a category with its available items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSection {
    pub id: Option<Uuid>,
    pub name: String,
    pub rank: i32,
    pub items: Vec<MenuItem>,
}
