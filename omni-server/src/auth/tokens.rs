//! Locally signed session tokens (HS256)
//!
//! Issued for magic logins and demo sandboxes. A sandbox token carries
//! `target_partition`, which is only honored on the demo host.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// `type` claim of every locally signed token
pub const MAGIC_TOKEN_TYPE: &str = "magic";

/// JWT claims for magic / sandbox sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicClaims {
    pub sub: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
    #[serde(rename = "type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_partition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Fields of a session token besides its lifetime
#[derive(Debug, Clone, Default)]
pub struct SessionGrant {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub target_partition: Option<String>,
}

/// HS256 issuer / verifier
#[derive(Clone)]
pub struct MagicTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl MagicTokens {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for `grant`
    pub fn issue(&self, grant: SessionGrant) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = MagicClaims {
            sub: grant.subject,
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            token_type: MAGIC_TOKEN_TYPE.to_string(),
            target_partition: grant.target_partition,
            email: grant.email,
            name: grant.name,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<MagicClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<MagicClaims>(token, &self.decoding, &validation)
            .map_err(AuthError::from)?;
        if data.claims.token_type != MAGIC_TOKEN_TYPE {
            return Err(AuthError::InvalidToken(format!(
                "unexpected token type: {}",
                data.claims.token_type
            )));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> SessionGrant {
        SessionGrant {
            subject: "lead-1".into(),
            email: Some("ada@example.test".into()),
            name: Some("Ada".into()),
            target_partition: Some("demo_0123456789ab".into()),
        }
    }

    #[test]
    fn issue_then_verify() {
        let tokens = MagicTokens::new("secret", 60);
        let token = tokens.issue(grant()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "lead-1");
        assert_eq!(claims.token_type, "magic");
        assert_eq!(claims.target_partition.as_deref(), Some("demo_0123456789ab"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = MagicTokens::new("secret", 60).issue(grant()).unwrap();
        let err = MagicTokens::new("other", 60).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60 s leeway
        let tokens = MagicTokens::new("secret", -5);
        let token = tokens.issue(grant()).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn non_magic_type_is_rejected() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = MagicClaims {
            sub: "x".into(),
            exp: now + 600,
            iat: now,
            token_type: "refresh".into(),
            target_partition: None,
            email: None,
            name: None,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let err = MagicTokens::new("secret", 60).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
