//! Request rate governor for order placement and sandbox creation
//!
//! Fixed TTL window per `(client address, endpoint path)`: the first hit
//! creates the counter and sets its expiry, later hits only increment. A
//! request is rejected once the counter exceeds the limit.
//!
//! Counters live in a [`CounterStore`]: in-process by default, Redis when
//! several server instances must share them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
#[error("counter store error: {0}")]
pub struct CounterStoreError(pub String);

/// Shared counters with atomic increment + expire
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key`, setting `window` as its expiry when newly created.
    /// Returns the count after the increment.
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64, CounterStoreError>;
}

struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

/// In-process counter store
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    inner: Arc<Mutex<HashMap<String, CounterEntry>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove expired counters
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();
        map.retain(|_, entry| entry.expires_at > now);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64, CounterStoreError> {
        let mut map = self.inner.lock().await;
        let now = Instant::now();
        let entry = map.entry(key.to_owned()).or_insert_with(|| CounterEntry {
            count: 0,
            expires_at: now + window,
        });

        // Expired but not yet cleaned up: start a new window
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + window;
        }

        entry.count += 1;
        Ok(entry.count)
    }
}

/// INCR, then EXPIRE only when the key was just created
const INCR_EXPIRE_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
"#;

/// Redis-backed counter store shared across instances
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: redis::aio::ConnectionManager,
    script: Arc<redis::Script>,
}

impl RedisCounterStore {
    pub async fn connect(url: &str) -> Result<Self, CounterStoreError> {
        let client = redis::Client::open(url).map_err(|e| CounterStoreError(e.to_string()))?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| CounterStoreError(e.to_string()))?;
        Ok(Self {
            conn,
            script: Arc::new(redis::Script::new(INCR_EXPIRE_SCRIPT)),
        })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64, CounterStoreError> {
        let mut conn = self.conn.clone();
        let count: u64 = self
            .script
            .key(key)
            .arg(window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CounterStoreError(e.to_string()))?;
        Ok(count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allow,
    Reject,
}

/// Sliding-window limiter keyed by `(client address, endpoint)`
#[derive(Clone)]
pub struct RateGovernor {
    store: Arc<dyn CounterStore>,
    limit: u64,
    window: Duration,
}

impl RateGovernor {
    pub fn new(store: Arc<dyn CounterStore>, limit: u64, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    pub fn key(client_ip: &str, path: &str) -> String {
        format!("rate_limit:{client_ip}:{path}")
    }

    /// Count one request for `(client_ip, path)` against the limit.
    ///
    /// A counter store outage lets the request through.
    pub async fn check(&self, client_ip: &str, path: &str) -> RateDecision {
        self.check_key(&Self::key(client_ip, path), self.limit, self.window)
            .await
    }

    pub async fn check_key(&self, key: &str, limit: u64, window: Duration) -> RateDecision {
        match self.store.incr_with_expiry(key, window).await {
            Ok(count) if count > limit => RateDecision::Reject,
            Ok(_) => RateDecision::Allow,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Rate limit store unavailable, allowing request");
                RateDecision::Allow
            }
        }
    }
}

/// Extract client IP: X-Forwarded-For header first (trusted proxy), then peer address.
pub fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // X-Forwarded-For can be comma-separated; first entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    // Fallback: peer address from extensions (ConnectInfo)
    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Rate limit middleware for order placement and sandbox creation
pub async fn order_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = extract_ip(&request);
    let path = request.uri().path().to_owned();
    if state.rate_governor.check(&ip, &path).await == RateDecision::Reject {
        tracing::info!(client = %ip, path = %path, "Rate limit exceeded");
        return AppError::too_many_requests("Too many orders placed. Please wait a moment.")
            .into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor(store: MemoryCounterStore, limit: u64, window_ms: u64) -> RateGovernor {
        RateGovernor::new(Arc::new(store), limit, Duration::from_millis(window_ms))
    }

    #[tokio::test]
    async fn rejects_after_limit_within_window() {
        let g = governor(MemoryCounterStore::new(), 3, 60_000);
        for _ in 0..3 {
            assert_eq!(g.check("10.0.0.1", "/api/v1/store/orders").await, RateDecision::Allow);
        }
        assert_eq!(g.check("10.0.0.1", "/api/v1/store/orders").await, RateDecision::Reject);
    }

    #[tokio::test]
    async fn keys_are_per_client_and_path() {
        let g = governor(MemoryCounterStore::new(), 1, 60_000);
        assert_eq!(g.check("10.0.0.1", "/a").await, RateDecision::Allow);
        assert_eq!(g.check("10.0.0.1", "/a").await, RateDecision::Reject);
        assert_eq!(g.check("10.0.0.2", "/a").await, RateDecision::Allow);
        assert_eq!(g.check("10.0.0.1", "/b").await, RateDecision::Allow);
    }

    #[tokio::test(start_paused = true)]
    async fn window_expiry_resets_counter() {
        let store = MemoryCounterStore::new();
        let g = governor(store.clone(), 1, 1_000);
        assert_eq!(g.check("ip", "/a").await, RateDecision::Allow);
        assert_eq!(g.check("ip", "/a").await, RateDecision::Reject);

        tokio::time::advance(Duration::from_millis(1_001)).await;
        store.cleanup().await;
        assert_eq!(store.len().await, 0);
        assert_eq!(g.check("ip", "/a").await, RateDecision::Allow);
    }

    struct BrokenStore;

    #[async_trait]
    impl CounterStore for BrokenStore {
        async fn incr_with_expiry(&self, _: &str, _: Duration) -> Result<u64, CounterStoreError> {
            Err(CounterStoreError("down".into()))
        }
    }

    #[tokio::test]
    async fn store_outage_fails_open() {
        let g = RateGovernor::new(Arc::new(BrokenStore), 0, Duration::from_secs(1));
        assert_eq!(g.check("ip", "/a").await, RateDecision::Allow);
    }

    #[test]
    fn forwarded_for_wins_over_peer() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&request), "203.0.113.7");

        let bare = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(extract_ip(&bare), "unknown");
    }

    #[test]
    fn key_format() {
        assert_eq!(
            RateGovernor::key("1.2.3.4", "/api/v1/store/orders"),
            "rate_limit:1.2.3.4:/api/v1/store/orders"
        );
    }
}
