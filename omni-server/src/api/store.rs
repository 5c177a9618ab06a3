//! Storefront endpoints: config, menu, order placement, order status

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, MenuItem, MenuSection, TenantConfigResponse};
use shared::order::{CreateOrderRequest, CreateOrderResponse, OrderView};
use uuid::Uuid;

use super::ApiResult;
use crate::orders::order_not_found;
use crate::state::AppState;
use crate::tenant::TenantContext;

/// Name of the section holding items without a category
const UNCATEGORIZED: &str = "More";

/// GET /api/v1/store/config
pub async fn get_config(
    Extension(ctx): Extension<TenantContext>,
) -> ApiResult<TenantConfigResponse> {
    ctx.require_tenant_partition()?;
    let tenant = ctx
        .tenant
        .as_ref()
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;
    Ok(Json(TenantConfigResponse::from(tenant)))
}

/// GET /api/v1/store/menu
pub async fn get_menu(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> ApiResult<Vec<MenuSection>> {
    let partition = ctx.require_tenant_partition()?;
    let categories = state.repos.catalog.list_categories(partition).await?;
    let items = state.repos.catalog.list_items(partition, true).await?;
    Ok(Json(build_sections(categories, items)))
}

/// POST /api/v1/store/orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<CreateOrderResponse> {
    let partition = ctx.require_tenant_partition()?;
    let response = state.pipeline.create(partition, req).await?;
    Ok(Json(response))
}

/// GET /api/v1/store/orders/{id}
///
/// A malformed id is reported like an unknown one.
pub async fn get_order_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<String>,
) -> ApiResult<OrderView> {
    let partition = ctx.require_tenant_partition()?;
    let id = Uuid::parse_str(&id).map_err(|_| order_not_found(&id))?;
    let order = state.pipeline.get_status(partition, id).await?;
    Ok(Json(order))
}

/// Group items under their categories (by rank); uncategorized items last
pub fn build_sections(mut categories: Vec<Category>, items: Vec<MenuItem>) -> Vec<MenuSection> {
    categories.sort_by_key(|c| c.rank);

    let mut by_category: HashMap<Option<Uuid>, Vec<MenuItem>> = HashMap::new();
    for item in items {
        by_category.entry(item.category_id).or_default().push(item);
    }

    let mut sections: Vec<MenuSection> = categories
        .into_iter()
        .filter_map(|c| {
            let items = by_category.remove(&Some(c.id))?;
            Some(MenuSection {
                id: Some(c.id),
                name: c.name,
                rank: c.rank,
                items,
            })
        })
        .collect();

    // Items whose category is missing land here as well
    let rest: Vec<MenuItem> = by_category.into_values().flatten().collect();
    if !rest.is_empty() {
        sections.push(MenuSection {
            id: None,
            name: UNCATEGORIZED.to_string(),
            rank: i32::MAX,
            items: rest,
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, rank: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            rank,
        }
    }

    fn item(name: &str, category_id: Option<Uuid>) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            category_id,
            name: name.into(),
            description: None,
            price: 100,
            image_url: None,
            is_available: true,
            modifier_groups: vec![],
        }
    }

    #[test]
    fn sections_follow_rank_and_skip_empty_categories() {
        let drinks = category("Drinks", 3);
        let mains = category("Mains", 1);
        let empty = category("Desserts", 2);
        let items = vec![
            item("Lemonade", Some(drinks.id)),
            item("Burger", Some(mains.id)),
            item("Mystery", None),
        ];

        let sections = build_sections(vec![drinks, mains, empty], items);
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Mains", "Drinks", UNCATEGORIZED]);
        assert_eq!(sections[2].items[0].name, "Mystery");
        assert!(sections[2].id.is_none());
    }
}
