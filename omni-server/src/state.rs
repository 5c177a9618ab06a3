//! Application state for omni-server

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    CounterStore, JwksVerifier, MagicTokens, MemoryCounterStore, RateGovernor, RedisCounterStore,
    TokenVerifier,
};
use crate::config::Config;
use crate::db::Repositories;
use crate::live::KitchenHub;
use crate::orders::OrderPipeline;
use crate::pricing::{PricingEngine, PricingMode};
use crate::tenant::{PartitionDirectory, TenantResolver};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Storage backend (PostgreSQL or in-memory)
    pub repos: Repositories,
    /// Tenant → partition lookups
    pub directory: PartitionDirectory,
    /// Per-request tenant resolution
    pub resolver: Arc<TenantResolver>,
    /// Magic / sandbox session tokens
    pub tokens: MagicTokens,
    /// Identity-provider key cache (SSO disabled when `None`)
    pub jwks: Option<Arc<JwksVerifier>>,
    /// Live kitchen display fan-out
    pub hub: KitchenHub,
    pub pipeline: OrderPipeline,
    /// Order / sandbox creation throttle
    pub rate_governor: RateGovernor,
    /// In-process counters, purged periodically (`None` with Redis)
    pub memory_counters: Option<MemoryCounterStore>,
}

impl AppState {
    /// Connect storage, counter store and identity provider from `config`
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let repos = Repositories::connect(&config.database_url).await?;

        let mut memory_counters = None;
        let counters: Arc<dyn CounterStore> = match &config.redis_url {
            Some(url) => {
                tracing::info!("Using Redis for rate limit counters");
                Arc::new(RedisCounterStore::connect(url).await?)
            }
            None => {
                let store = MemoryCounterStore::new();
                memory_counters = Some(store.clone());
                Arc::new(store)
            }
        };

        let jwks = match &config.jwks_url {
            Some(url) => Some(Arc::new(JwksVerifier::new(
                url.clone(),
                config.oidc_audience.clone(),
                config.oidc_algorithm,
                config.jwks_cache_ttl(),
                config.idp_timeout(),
            )?)),
            None => {
                tracing::info!("JWKS_URL not set, single sign-on disabled");
                None
            }
        };

        Ok(Self::from_parts(config.clone(), repos, counters, memory_counters, jwks))
    }

    /// Wire state from already-built parts
    pub fn from_parts(
        config: Config,
        repos: Repositories,
        counters: Arc<dyn CounterStore>,
        memory_counters: Option<MemoryCounterStore>,
        jwks: Option<Arc<JwksVerifier>>,
    ) -> Self {
        let tokens = MagicTokens::new(&config.secret_key, config.magic_token_ttl_minutes);
        let directory = PartitionDirectory::new(repos.tenants.clone());
        let resolver = TenantResolver::new(
            TokenVerifier::new(tokens.clone(), jwks.clone()),
            directory.clone(),
            &config.demo_domain,
            &config.admin_domain,
            config.super_admins.clone(),
        );

        let hub = KitchenHub::new();
        let pricing = PricingEngine::new(
            repos.catalog.clone(),
            PricingMode::from_strict(config.pricing_strict),
        );
        let pipeline = OrderPipeline::new(repos.orders.clone(), pricing, hub.clone());
        let rate_governor =
            RateGovernor::new(counters, config.order_rate_limit, config.order_rate_window());

        Self {
            config: Arc::new(config),
            repos,
            directory,
            resolver: Arc::new(resolver),
            tokens,
            jwks,
            hub,
            pipeline,
            rate_governor,
            memory_counters,
        }
    }

    /// Periodic housekeeping: expired counters, JWKS refresh
    pub async fn run_maintenance(&self) {
        if let Some(counters) = &self.memory_counters {
            counters.cleanup().await;
        }
        if let Some(jwks) = &self.jwks
            && let Err(e) = jwks.refresh().await
        {
            tracing::warn!(error = %e, "Background JWKS refresh failed");
        }
    }

    /// Spawn [`Self::run_maintenance`] every `period`
    pub fn spawn_maintenance(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // skip immediate
            loop {
                interval.tick().await;
                state.run_maintenance().await;
            }
        })
    }
}
