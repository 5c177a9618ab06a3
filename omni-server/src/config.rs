//! Server configuration

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `postgres://…` or `memory://` for the in-process backend
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 key for magic / sandbox tokens
    pub secret_key: String,
    pub magic_token_ttl_minutes: i64,
    /// Host that serves every sandbox, distinguished by token
    pub demo_domain: String,
    /// Host of the super-admin console (shared namespace)
    pub admin_domain: String,
    /// Lower-cased emails allowed on the admin host
    pub super_admins: Vec<String>,
    /// Identity provider JWKS endpoint (`None` disables SSO)
    pub jwks_url: Option<String>,
    pub oidc_audience: Option<String>,
    pub oidc_algorithm: jsonwebtoken::Algorithm,
    pub jwks_cache_ttl_secs: u64,
    pub idp_timeout_ms: u64,
    /// Shared counter store for rate limiting (in-process when unset)
    pub redis_url: Option<String>,
    pub order_rate_limit: u64,
    pub order_rate_window_secs: u64,
    /// Default pricing mode: reject unresolvable cart lines
    pub pricing_strict: bool,
    /// `json` for machine-readable logs
    pub log_format: Option<String>,
    /// Daily-rolling log files are written here when set
    pub log_dir: Option<String>,
    /// Empty means any origin
    pub cors_allow_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "memory://".into(),
            http_port: 8080,
            environment: "development".into(),
            secret_key: "dev-SECRET_KEY-not-for-production".into(),
            magic_token_ttl_minutes: 60,
            demo_domain: "demo.localhost".into(),
            admin_domain: "admin.localhost".into(),
            super_admins: Vec::new(),
            jwks_url: None,
            oidc_audience: None,
            oidc_algorithm: jsonwebtoken::Algorithm::RS256,
            jwks_cache_ttl_secs: 300,
            idp_timeout_ms: 3000,
            redis_url: None,
            order_rate_limit: 3,
            order_rate_window_secs: 60,
            pricing_strict: false,
            log_format: None,
            log_dir: None,
            cors_allow_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn optional(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|s| !s.trim().is_empty())
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn list(name: &str) -> Vec<String> {
        std::env::var(name)
            .map(|v| split_list(&v))
            .unwrap_or_default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) if environment == "development" => defaults.database_url.clone(),
            Err(_) => return Err("DATABASE_URL must be set".into()),
        };

        let oidc_algorithm = match Self::optional("OIDC_ALGORITHM") {
            Some(alg) => alg
                .parse()
                .map_err(|_| format!("OIDC_ALGORITHM is not a JWT algorithm: {alg}"))?,
            None => defaults.oidc_algorithm,
        };

        Ok(Self {
            database_url,
            http_port: Self::parsed("HTTP_PORT", defaults.http_port),
            secret_key: Self::require_secret("SECRET_KEY", &environment)?,
            magic_token_ttl_minutes: Self::parsed(
                "MAGIC_TOKEN_TTL_MINUTES",
                defaults.magic_token_ttl_minutes,
            ),
            demo_domain: Self::optional("DEMO_DOMAIN")
                .map(|d| d.to_lowercase())
                .unwrap_or(defaults.demo_domain),
            admin_domain: Self::optional("ADMIN_DOMAIN")
                .map(|d| d.to_lowercase())
                .unwrap_or(defaults.admin_domain),
            super_admins: Self::list("SUPER_ADMINS")
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
            jwks_url: Self::optional("JWKS_URL"),
            oidc_audience: Self::optional("OIDC_AUDIENCE"),
            oidc_algorithm,
            jwks_cache_ttl_secs: Self::parsed("JWKS_CACHE_TTL_SECS", defaults.jwks_cache_ttl_secs),
            idp_timeout_ms: Self::parsed("IDP_TIMEOUT_MS", defaults.idp_timeout_ms),
            redis_url: Self::optional("REDIS_URL"),
            order_rate_limit: Self::parsed("ORDER_RATE_LIMIT", defaults.order_rate_limit),
            order_rate_window_secs: Self::parsed(
                "ORDER_RATE_WINDOW_SECS",
                defaults.order_rate_window_secs,
            ),
            pricing_strict: Self::parsed("PRICING_STRICT", defaults.pricing_strict),
            log_format: Self::optional("LOG_FORMAT"),
            log_dir: Self::optional("LOG_DIR"),
            cors_allow_origins: Self::list("CORS_ALLOW_ORIGINS"),
            environment,
        })
    }

    pub fn idp_timeout(&self) -> Duration {
        Duration::from_millis(self.idp_timeout_ms)
    }

    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    pub fn order_rate_window(&self) -> Duration {
        Duration::from_secs(self.order_rate_window_secs)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
