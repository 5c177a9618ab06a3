//! PostgreSQL backend
//!
//! - `public.tenants`, `public.leads`: created by `sqlx::migrate!`
//! - one schema per partition: created by `create_partition`
//!
//! Partition-scoped SQL is schema-qualified with the validated handle; the
//! connection's `search_path` is never touched.

mod catalog;
mod leads;
mod orders;
mod tenants;

use async_trait::async_trait;
use shared::models::{Category, Lead, MenuItem, Tenant, TenantCreate};
use shared::order::{OrderStatus, OrderView};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    CatalogRepository, CatalogSeed, LeadCreate, LeadRepository, NewOrder, OrderRepository,
    RepoResult, TenantRepository, ensure_tenant_partition,
};
use crate::tenant::Partition;

/// Schema-qualified table name
pub(crate) fn table(partition: &Partition, name: &str) -> String {
    format!("\"{partition}\".{name}")
}

fn partition_ddl(partition: &Partition) -> String {
    let categories = table(partition, "categories");
    let items = table(partition, "menu_items");
    let groups = table(partition, "modifier_groups");
    let options = table(partition, "modifier_options");
    let orders = table(partition, "orders");
    let counters = table(partition, "ticket_counters");
    format!(
        r#"
        CREATE SCHEMA IF NOT EXISTS "{partition}";

        CREATE TABLE IF NOT EXISTS {categories} (
            id   UUID PRIMARY KEY,
            name TEXT NOT NULL,
            rank INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS {items} (
            id           UUID PRIMARY KEY,
            category_id  UUID REFERENCES {categories} (id) ON DELETE SET NULL,
            name         TEXT NOT NULL,
            description  TEXT,
            price        BIGINT NOT NULL CHECK (price >= 0),
            image_url    TEXT,
            is_available BOOLEAN NOT NULL DEFAULT TRUE
        );

        CREATE TABLE IF NOT EXISTS {groups} (
            id            UUID PRIMARY KEY,
            item_id       UUID NOT NULL REFERENCES {items} (id) ON DELETE CASCADE,
            name          TEXT NOT NULL,
            min_selection INTEGER NOT NULL DEFAULT 0,
            max_selection INTEGER NOT NULL DEFAULT 1,
            CHECK (0 <= min_selection AND min_selection <= max_selection)
        );

        CREATE TABLE IF NOT EXISTS {options} (
            id               UUID PRIMARY KEY,
            group_id         UUID NOT NULL REFERENCES {groups} (id) ON DELETE CASCADE,
            name             TEXT NOT NULL,
            price_adjustment BIGINT NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS {orders} (
            id            UUID PRIMARY KEY,
            ticket_number INTEGER NOT NULL,
            business_day  DATE NOT NULL,
            customer_name TEXT NOT NULL,
            table_number  TEXT,
            status        TEXT NOT NULL DEFAULT 'PENDING',
            total_amount  BIGINT NOT NULL,
            items         JSONB NOT NULL,
            created_at    BIGINT NOT NULL,
            updated_at    BIGINT NOT NULL,
            UNIQUE (business_day, ticket_number)
        );

        CREATE INDEX IF NOT EXISTS orders_status_created_idx
            ON {orders} (status, created_at);

        CREATE TABLE IF NOT EXISTS {counters} (
            business_day DATE PRIMARY KEY,
            last_ticket  INTEGER NOT NULL,
            updated_at   BIGINT NOT NULL
        );
        "#
    )
}

/// PostgreSQL-backed repositories
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply shared-namespace migrations
    pub async fn connect(database_url: &str) -> RepoResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("PostgreSQL ready, shared namespace migrated");
        Ok(Self { pool })
    }
}

#[async_trait]
impl TenantRepository for PgStore {
    async fn find_by_domain(&self, domain: &str) -> RepoResult<Option<Tenant>> {
        tenants::find_by_domain(&self.pool, domain).await
    }

    async fn find_by_partition(&self, partition: &Partition) -> RepoResult<Option<Tenant>> {
        tenants::find_by_schema(&self.pool, partition.as_str()).await
    }

    async fn create(&self, data: TenantCreate) -> RepoResult<Tenant> {
        tenants::create(&self.pool, data).await
    }

    async fn create_partition(&self, partition: &Partition) -> RepoResult<()> {
        ensure_tenant_partition(partition)?;
        let ddl = partition_ddl(partition);
        let mut tx = self.pool.begin().await?;
        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(&ddl)).await?;
        tx.commit().await?;
        tracing::info!(partition = %partition, "Partition schema ready");
        Ok(())
    }

    async fn reset_partition(&self, partition: &Partition, seed: &CatalogSeed) -> RepoResult<u64> {
        ensure_tenant_partition(partition)?;
        let mut tx = self.pool.begin().await?;
        let removed = orders::purge(&mut tx, partition).await?;
        catalog::clear(&mut tx, partition).await?;
        catalog::insert_seed(&mut tx, partition, seed).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn list_categories(&self, partition: &Partition) -> RepoResult<Vec<Category>> {
        ensure_tenant_partition(partition)?;
        catalog::list_categories(&self.pool, partition).await
    }

    async fn list_items(
        &self,
        partition: &Partition,
        only_available: bool,
    ) -> RepoResult<Vec<MenuItem>> {
        ensure_tenant_partition(partition)?;
        catalog::list_items(&self.pool, partition, only_available).await
    }

    async fn find_items(&self, partition: &Partition, ids: &[Uuid]) -> RepoResult<Vec<MenuItem>> {
        ensure_tenant_partition(partition)?;
        catalog::find_items(&self.pool, partition, ids).await
    }

    async fn insert_seed(&self, partition: &Partition, seed: &CatalogSeed) -> RepoResult<()> {
        ensure_tenant_partition(partition)?;
        let mut tx = self.pool.begin().await?;
        catalog::insert_seed(&mut tx, partition, seed).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn insert_with_ticket(
        &self,
        partition: &Partition,
        order: NewOrder,
    ) -> RepoResult<OrderView> {
        ensure_tenant_partition(partition)?;
        orders::insert_with_ticket(&self.pool, partition, order).await
    }

    async fn find(&self, partition: &Partition, id: Uuid) -> RepoResult<Option<OrderView>> {
        ensure_tenant_partition(partition)?;
        orders::find(&self.pool, partition, id).await
    }

    async fn list_active(&self, partition: &Partition) -> RepoResult<Vec<OrderView>> {
        ensure_tenant_partition(partition)?;
        orders::list_active(&self.pool, partition).await
    }

    async fn compare_and_set_status(
        &self,
        partition: &Partition,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<Option<OrderView>> {
        ensure_tenant_partition(partition)?;
        orders::compare_and_set_status(&self.pool, partition, id, expected, next).await
    }
}

#[async_trait]
impl LeadRepository for PgStore {
    async fn record(&self, lead: LeadCreate) -> RepoResult<Lead> {
        leads::create(&self.pool, lead).await
    }
}
