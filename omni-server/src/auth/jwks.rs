//! Identity-provider token verification against a cached JWKS
//!
//! Keys are fetched once per TTL and refreshed in the background. A failed
//! fetch falls back to the last good key set; with nothing cached the
//! provider is reported unavailable. An unknown `kid` triggers at most one
//! refetch per `UNKNOWN_KEY_REFRESH_INTERVAL`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::Deserialize;

use super::AuthError;

/// Claims taken from identity-provider tokens
#[derive(Debug, Clone, Deserialize)]
pub struct IdpClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Where the key set comes from
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// JWKS document served over HTTP by the identity provider
pub struct HttpKeySource {
    url: String,
    http: reqwest::Client,
}

impl HttpKeySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AuthError::ProviderUnavailable(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }
        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))
    }
}

/// Minimum gap between fetches triggered by an unknown `kid`
const UNKNOWN_KEY_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

pub struct JwksVerifier {
    source: Arc<dyn KeySource>,
    audience: Option<String>,
    algorithm: Algorithm,
    ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
    /// Serializes fetches and holds the time of the last attempt
    last_attempt: tokio::sync::Mutex<Option<Instant>>,
}

impl JwksVerifier {
    pub fn new(
        url: impl Into<String>,
        audience: Option<String>,
        algorithm: Algorithm,
        ttl: Duration,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let source = HttpKeySource::new(url, timeout)?;
        Ok(Self::with_source(Arc::new(source), audience, algorithm, ttl))
    }

    pub fn with_source(
        source: Arc<dyn KeySource>,
        audience: Option<String>,
        algorithm: Algorithm,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            audience,
            algorithm,
            ttl,
            cache: RwLock::new(None),
            last_attempt: tokio::sync::Mutex::new(None),
        }
    }

    /// Seed the cache with a known key set
    pub fn with_keys(self, keys: JwkSet) -> Self {
        *self.cache.write() = Some(CachedKeys {
            keys: Arc::new(keys),
            fetched_at: Instant::now(),
        });
        self
    }

    fn cached(&self, fresh_only: bool) -> Option<Arc<JwkSet>> {
        let cache = self.cache.read();
        cache
            .as_ref()
            .filter(|c| !fresh_only || c.fetched_at.elapsed() < self.ttl)
            .map(|c| c.keys.clone())
    }

    async fn fetch_into_cache(
        &self,
        last_attempt: &mut Option<Instant>,
    ) -> Result<Arc<JwkSet>, AuthError> {
        *last_attempt = Some(Instant::now());
        let keys = Arc::new(self.source.fetch().await?);
        *self.cache.write() = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        tracing::debug!(keys = keys.keys.len(), "JWKS refreshed");
        Ok(keys)
    }

    /// Fetch the key set now and replace the cache
    pub async fn refresh(&self) -> Result<Arc<JwkSet>, AuthError> {
        let mut last_attempt = self.last_attempt.lock().await;
        self.fetch_into_cache(&mut *last_attempt).await
    }

    /// Refetch for an unknown `kid`, at most once per interval.
    /// `None` when the interval has not elapsed or the fetch failed.
    async fn refresh_for_unknown_key(&self) -> Option<Arc<JwkSet>> {
        let mut last_attempt = self.last_attempt.lock().await;
        if last_attempt.is_some_and(|at| at.elapsed() < UNKNOWN_KEY_REFRESH_INTERVAL) {
            return None;
        }
        match self.fetch_into_cache(&mut *last_attempt).await {
            Ok(keys) => Some(keys),
            Err(e) => {
                tracing::warn!(error = %e, "JWKS refresh for unknown key failed");
                None
            }
        }
    }

    /// Fresh keys, else a refresh, else the stale keys
    async fn keys(&self) -> Result<Arc<JwkSet>, AuthError> {
        if let Some(keys) = self.cached(true) {
            return Ok(keys);
        }
        match self.refresh().await {
            Ok(keys) => Ok(keys),
            Err(e) => match self.cached(false) {
                Some(stale) => {
                    tracing::warn!(error = %e, "JWKS refresh failed, using stale keys");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    pub async fn verify(&self, token: &str) -> Result<IdpClaims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(AuthError::from)?;
        if header.alg != self.algorithm {
            return Err(AuthError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no key id".into()))?;

        let mut keys = self.keys().await?;
        if keys.find(&kid).is_none() {
            // Key rotation: the provider may have published a new key
            if let Some(refreshed) = self.refresh_for_unknown_key().await {
                keys = refreshed;
            }
        }
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key {kid}")))?;
        let key = DecodingKey::from_jwk(jwk).map_err(AuthError::from)?;

        let mut validation = Validation::new(self.algorithm);
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let data =
            jsonwebtoken::decode::<IdpClaims>(token, &key, &validation).map_err(AuthError::from)?;
        Ok(data.claims)
    }
}
