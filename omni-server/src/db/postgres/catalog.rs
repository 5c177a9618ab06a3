use std::collections::HashMap;

use shared::models::{Category, MenuItem, ModifierGroup, ModifierOption};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::table;
use crate::db::{CatalogSeed, RepoResult};
use crate::tenant::Partition;

pub async fn list_categories(pool: &PgPool, partition: &Partition) -> RepoResult<Vec<Category>> {
    let sql = format!(
        "SELECT id, name, rank FROM {} ORDER BY rank, name",
        table(partition, "categories")
    );
    Ok(sqlx::query_as(&sql).fetch_all(pool).await?)
}

pub async fn list_items(
    pool: &PgPool,
    partition: &Partition,
    only_available: bool,
) -> RepoResult<Vec<MenuItem>> {
    let sql = format!(
        "SELECT * FROM {} WHERE is_available OR NOT $1 ORDER BY name",
        table(partition, "menu_items")
    );
    let items: Vec<MenuItem> = sqlx::query_as(&sql)
        .bind(only_available)
        .fetch_all(pool)
        .await?;
    attach_modifiers(pool, partition, items).await
}

pub async fn find_items(
    pool: &PgPool,
    partition: &Partition,
    ids: &[Uuid],
) -> RepoResult<Vec<MenuItem>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT * FROM {} WHERE id = ANY($1)",
        table(partition, "menu_items")
    );
    let items: Vec<MenuItem> = sqlx::query_as(&sql).bind(ids).fetch_all(pool).await?;
    attach_modifiers(pool, partition, items).await
}

/// Load groups and options for `items` with two queries total
async fn attach_modifiers(
    pool: &PgPool,
    partition: &Partition,
    mut items: Vec<MenuItem>,
) -> RepoResult<Vec<MenuItem>> {
    if items.is_empty() {
        return Ok(items);
    }
    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();

    let groups_sql = format!(
        "SELECT * FROM {} WHERE item_id = ANY($1) ORDER BY name",
        table(partition, "modifier_groups")
    );
    let mut groups: Vec<ModifierGroup> = sqlx::query_as(&groups_sql)
        .bind(&item_ids)
        .fetch_all(pool)
        .await?;

    let group_ids: Vec<Uuid> = groups.iter().map(|g| g.id).collect();
    let options_sql = format!(
        "SELECT * FROM {} WHERE group_id = ANY($1) ORDER BY price_adjustment, name",
        table(partition, "modifier_options")
    );
    let options: Vec<ModifierOption> = sqlx::query_as(&options_sql)
        .bind(&group_ids)
        .fetch_all(pool)
        .await?;

    let mut options_by_group: HashMap<Uuid, Vec<ModifierOption>> = HashMap::new();
    for option in options {
        options_by_group
            .entry(option.group_id)
            .or_default()
            .push(option);
    }
    for group in &mut groups {
        group.options = options_by_group.remove(&group.id).unwrap_or_default();
    }

    let mut groups_by_item: HashMap<Uuid, Vec<ModifierGroup>> = HashMap::new();
    for group in groups {
        groups_by_item.entry(group.item_id).or_default().push(group);
    }
    for item in &mut items {
        item.modifier_groups = groups_by_item.remove(&item.id).unwrap_or_default();
    }
    Ok(items)
}

pub async fn insert_seed(
    conn: &mut PgConnection,
    partition: &Partition,
    seed: &CatalogSeed,
) -> RepoResult<()> {
    let categories_sql = format!(
        "INSERT INTO {} (id, name, rank) VALUES ($1, $2, $3)",
        table(partition, "categories")
    );
    let items_sql = format!(
        "INSERT INTO {} (id, category_id, name, description, price, image_url, is_available)
         VALUES ($1, $2, $3, $4, $5, $6, TRUE)",
        table(partition, "menu_items")
    );
    let groups_sql = format!(
        "INSERT INTO {} (id, item_id, name, min_selection, max_selection)
         VALUES ($1, $2, $3, $4, $5)",
        table(partition, "modifier_groups")
    );
    let options_sql = format!(
        "INSERT INTO {} (id, group_id, name, price_adjustment) VALUES ($1, $2, $3, $4)",
        table(partition, "modifier_options")
    );

    for category in &seed.categories {
        let category_id = Uuid::new_v4();
        sqlx::query(&categories_sql)
            .bind(category_id)
            .bind(category.name)
            .bind(category.rank)
            .execute(&mut *conn)
            .await?;

        for item in &category.items {
            let item_id = Uuid::new_v4();
            sqlx::query(&items_sql)
                .bind(item_id)
                .bind(category_id)
                .bind(item.name)
                .bind(item.description)
                .bind(item.price)
                .bind(item.image_url)
                .execute(&mut *conn)
                .await?;

            for group in &item.groups {
                let group_id = Uuid::new_v4();
                sqlx::query(&groups_sql)
                    .bind(group_id)
                    .bind(item_id)
                    .bind(group.name)
                    .bind(group.min_selection)
                    .bind(group.max_selection)
                    .execute(&mut *conn)
                    .await?;

                for option in &group.options {
                    sqlx::query(&options_sql)
                        .bind(Uuid::new_v4())
                        .bind(group_id)
                        .bind(option.name)
                        .bind(option.price_adjustment)
                        .execute(&mut *conn)
                        .await?;
                }
            }
        }
    }
    Ok(())
}

pub async fn clear(conn: &mut PgConnection, partition: &Partition) -> RepoResult<()> {
    for name in [
        "modifier_options",
        "modifier_groups",
        "menu_items",
        "categories",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table(partition, name)))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
