//! Partition Directory: tenant identifier → partition handle
//!
//! Host lookups are cached briefly since every storefront request performs
//! one. Registrations invalidate the cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use shared::models::{Tenant, TenantCreate};

use super::Partition;
use crate::db::{RepoError, RepoResult, TenantRepository};

const HOST_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Clone)]
struct CachedTenant {
    tenant: Tenant,
    cached_at: Instant,
}

#[derive(Clone)]
pub struct PartitionDirectory {
    tenants: Arc<dyn TenantRepository>,
    by_host: Arc<DashMap<String, CachedTenant>>,
}

impl PartitionDirectory {
    pub fn new(tenants: Arc<dyn TenantRepository>) -> Self {
        Self {
            tenants,
            by_host: Arc::new(DashMap::new()),
        }
    }

    /// Tenant registered under a public hostname
    pub async fn by_host(&self, host: &str) -> RepoResult<Option<Tenant>> {
        if let Some(hit) = self.by_host.get(host)
            && hit.cached_at.elapsed() < HOST_CACHE_TTL
        {
            return Ok(Some(hit.tenant.clone()));
        }

        let tenant = self.tenants.find_by_domain(host).await?;
        match &tenant {
            Some(t) => {
                self.by_host.insert(
                    host.to_string(),
                    CachedTenant {
                        tenant: t.clone(),
                        cached_at: Instant::now(),
                    },
                );
            }
            None => {
                self.by_host.remove(host);
            }
        }
        Ok(tenant)
    }

    pub async fn by_partition(&self, partition: &Partition) -> RepoResult<Option<Tenant>> {
        self.tenants.find_by_partition(partition).await
    }

    /// Partition handle of a tenant record
    pub fn partition_of(tenant: &Tenant) -> RepoResult<Partition> {
        Partition::parse(&tenant.schema_name).map_err(|e| {
            RepoError::Database(format!("tenant {} has a bad partition: {e}", tenant.id))
        })
    }

    /// Create the partition, then record the tenant that owns it.
    ///
    /// Partition creation is idempotent, so a rejected registration (domain
    /// taken) leaves at most an empty namespace behind.
    pub async fn register(&self, data: TenantCreate) -> RepoResult<(Tenant, Partition)> {
        let partition = Partition::parse(&data.schema_name)
            .map_err(|e| RepoError::Validation(e.to_string()))?;
        self.tenants.create_partition(&partition).await?;
        let tenant = self.tenants.create(data).await?;
        if let Some(domain) = &tenant.domain {
            self.by_host.remove(domain);
        }
        tracing::info!(
            tenant = %tenant.name,
            partition = %partition,
            sandbox = tenant.is_sandbox,
            "Tenant registered"
        );
        Ok((tenant, partition))
    }
}
