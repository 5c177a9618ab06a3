//! Caller authentication and request throttling
//!
//! - [`tokens`]: locally signed HS256 session tokens (magic login, sandboxes)
//! - [`jwks`]: identity-provider tokens verified against a cached JWKS
//! - [`rate_limit`]: per-client, per-endpoint order throttling

pub mod jwks;
pub mod rate_limit;
pub mod tokens;

use std::sync::Arc;

use jsonwebtoken::Algorithm;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};

pub use jwks::{HttpKeySource, IdpClaims, JwksVerifier, KeySource};
pub use rate_limit::{
    CounterStore, MemoryCounterStore, RateDecision, RateGovernor, RedisCounterStore, extract_ip,
};
pub use tokens::{MagicClaims, MagicTokens, SessionGrant};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    Expired,
    #[error("identity provider not configured")]
    NotConfigured,
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            JwtErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken => AppError::new(ErrorCode::NotAuthenticated),
            AuthError::Expired => AppError::new(ErrorCode::TokenExpired),
            AuthError::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Token rejected");
                AppError::new(ErrorCode::TokenInvalid)
            }
            AuthError::NotConfigured => {
                AppError::with_message(ErrorCode::TokenInvalid, "Single sign-on is not enabled")
            }
            AuthError::ProviderUnavailable(reason) => {
                tracing::warn!(reason = %reason, "Identity provider unavailable");
                AppError::new(ErrorCode::IdentityProviderUnavailable)
            }
            AuthError::Signing(reason) => {
                tracing::error!(reason = %reason, "Token signing failed");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

/// How the caller proved its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    /// Identity-provider token (interactive SSO)
    InteractiveSso,
    /// Locally signed short-lived session token
    SessionToken,
}

/// Verified caller identity
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Identity-provider groups (partition handles grant staff access)
    pub groups: Vec<String>,
    /// Partition a session token is bound to
    pub target_partition: Option<String>,
    pub method: AuthMethod,
}

impl From<MagicClaims> for Identity {
    fn from(claims: MagicClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            name: claims.name,
            groups: Vec::new(),
            target_partition: claims.target_partition,
            method: AuthMethod::SessionToken,
        }
    }
}

impl From<IdpClaims> for Identity {
    fn from(claims: IdpClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            name: claims.name,
            groups: claims.groups,
            target_partition: None,
            method: AuthMethod::InteractiveSso,
        }
    }
}

/// Dispatches a bearer token to the right verifier by its header algorithm
#[derive(Clone)]
pub struct TokenVerifier {
    magic: MagicTokens,
    idp: Option<Arc<JwksVerifier>>,
}

impl TokenVerifier {
    pub fn new(magic: MagicTokens, idp: Option<Arc<JwksVerifier>>) -> Self {
        Self { magic, idp }
    }

    pub async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(AuthError::from)?;
        if header.alg == Algorithm::HS256 {
            return self.magic.verify(token).map(Identity::from);
        }
        let idp = self.idp.as_ref().ok_or(AuthError::NotConfigured)?;
        idp.verify(token).await.map(Identity::from)
    }
}

/// Token from an `Authorization: Bearer …` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
