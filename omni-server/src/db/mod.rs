//! Database access layer
//!
//! Storage is reached only through the repository traits below. Every
//! partition-scoped call takes its [`Partition`] explicitly; no backend keeps
//! an "active partition" on a connection.
//!
//! Backends:
//! - [`postgres`]: one schema per partition, shared tables in `public`
//! - [`memory`]: in-process maps with the same semantics (dev + tests)

pub mod memory;
pub mod postgres;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{Category, Lead, MenuItem, Tenant, TenantCreate};
use shared::order::{LineSnapshot, OrderStatus, OrderView};
use thiserror::Error;
use uuid::Uuid;

use crate::tenant::Partition;

pub use seed::{CatalogSeed, SeedCategory, SeedGroup, SeedItem, SeedOption};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for RepoError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Order row ready to be written; ticket number is assigned by storage
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub customer_name: String,
    pub table_number: Option<String>,
    pub total_amount: i64,
    pub items: Vec<LineSnapshot>,
    pub business_day: NaiveDate,
    pub created_at: i64,
}

/// New lead record (shared namespace)
#[derive(Debug, Clone)]
pub struct LeadCreate {
    pub name: String,
    pub email: String,
    pub business_name: Option<String>,
    pub partition: Partition,
}

// =============================================================================
// Repository traits
// =============================================================================

/// Tenant directory (shared namespace)
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_domain(&self, domain: &str) -> RepoResult<Option<Tenant>>;

    async fn find_by_partition(&self, partition: &Partition) -> RepoResult<Option<Tenant>>;

    /// `Duplicate` when the domain or the partition is already registered
    async fn create(&self, data: TenantCreate) -> RepoResult<Tenant>;

    /// Create the partition's namespace and tables (idempotent)
    async fn create_partition(&self, partition: &Partition) -> RepoResult<()>;

    /// Delete the partition's orders, ticket counters and catalog, then
    /// insert `seed`, all or nothing. Returns the number of orders removed.
    async fn reset_partition(&self, partition: &Partition, seed: &CatalogSeed) -> RepoResult<u64>;
}

/// Per-partition catalog
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Categories ordered by rank
    async fn list_categories(&self, partition: &Partition) -> RepoResult<Vec<Category>>;

    /// Items with their modifier groups and options populated
    async fn list_items(
        &self,
        partition: &Partition,
        only_available: bool,
    ) -> RepoResult<Vec<MenuItem>>;

    /// Bulk fetch of the given items (groups + options populated) in one pass.
    /// Unknown ids are absent from the result.
    async fn find_items(&self, partition: &Partition, ids: &[Uuid]) -> RepoResult<Vec<MenuItem>>;

    async fn insert_seed(&self, partition: &Partition, seed: &CatalogSeed) -> RepoResult<()>;
}

/// Per-partition orders and ticket counters
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Assign the day's next ticket and insert the order as PENDING in one
    /// transaction. A failed insert also gives back its ticket.
    async fn insert_with_ticket(&self, partition: &Partition, order: NewOrder)
    -> RepoResult<OrderView>;

    async fn find(&self, partition: &Partition, id: Uuid) -> RepoResult<Option<OrderView>>;

    /// Non-completed orders, oldest first
    async fn list_active(&self, partition: &Partition) -> RepoResult<Vec<OrderView>>;

    /// Set `status = next` only while the stored status is still `expected`.
    ///
    /// `Ok(None)` means the status changed underneath; `NotFound` means the
    /// order does not exist.
    async fn compare_and_set_status(
        &self,
        partition: &Partition,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<Option<OrderView>>;
}

/// Sandbox visitor records (shared namespace, write-once)
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn record(&self, lead: LeadCreate) -> RepoResult<Lead>;
}

/// All repositories of one backend
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub leads: Arc<dyn LeadRepository>,
}

impl Repositories {
    /// Connect the backend named by `database_url`
    pub async fn connect(database_url: &str) -> RepoResult<Self> {
        if database_url.starts_with("memory://") {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            return Ok(Self::in_memory());
        }
        let db = postgres::PgStore::connect(database_url).await?;
        Ok(Self::from_store(Arc::new(db)))
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(memory::MemoryStore::new()))
    }

    /// Wire every repository to one backend instance
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: TenantRepository + CatalogRepository + OrderRepository + LeadRepository + 'static,
    {
        Self {
            tenants: store.clone(),
            catalog: store.clone(),
            orders: store.clone(),
            leads: store,
        }
    }
}

/// Reject operations aimed at the shared namespace
pub(crate) fn ensure_tenant_partition(partition: &Partition) -> RepoResult<()> {
    if partition.is_shared() {
        return Err(RepoError::Validation(
            "shared namespace holds no catalog or orders".into(),
        ));
    }
    Ok(())
}
