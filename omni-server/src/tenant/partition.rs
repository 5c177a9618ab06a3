//! Partition handles
//!
//! A partition is one tenant's isolated namespace inside the shared store
//! (a PostgreSQL schema). Handles are validated once at construction, so
//! storage code can interpolate them into schema-qualified SQL.

use std::fmt;

use serde::{Serialize, Serializer};
use shared::error::{AppError, ErrorCode};

/// Shared, un-partitioned namespace (tenant directory + leads)
const SHARED: &str = "public";
const MAX_LEN: usize = 63;
const RESERVED: &[&str] = &["public", "information_schema", "pg_catalog", "pg_toast"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Partition(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("partition handle is empty")]
    Empty,
    #[error("partition handle is longer than {MAX_LEN} characters")]
    TooLong,
    #[error("partition handle must start with a lowercase letter: {0}")]
    BadStart(String),
    #[error("partition handle may only contain [a-z0-9_]: {0}")]
    BadChar(String),
    #[error("partition handle is reserved: {0}")]
    Reserved(String),
}

impl Partition {
    /// Validate a tenant partition handle (`^[a-z][a-z0-9_]{0,62}$`)
    pub fn parse(raw: &str) -> Result<Self, PartitionError> {
        let mut chars = raw.chars();
        let first = chars.next().ok_or(PartitionError::Empty)?;
        if raw.len() > MAX_LEN {
            return Err(PartitionError::TooLong);
        }
        if !first.is_ascii_lowercase() {
            return Err(PartitionError::BadStart(raw.to_string()));
        }
        if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
            return Err(PartitionError::BadChar(raw.to_string()));
        }
        if RESERVED.contains(&raw) || raw.starts_with("pg_") {
            return Err(PartitionError::Reserved(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// The shared namespace, reachable only from the admin host
    pub fn shared() -> Self {
        Self(SHARED.to_string())
    }

    pub fn is_shared(&self) -> bool {
        self.0 == SHARED
    }

    /// Partition for a provisioned tenant: `tenant_` + alphanumerics of the name
    pub fn for_tenant_name(name: &str) -> Result<Self, PartitionError> {
        let slug: String = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        if slug.is_empty() {
            return Err(PartitionError::Empty);
        }
        let mut handle = format!("tenant_{slug}");
        handle.truncate(MAX_LEN);
        Self::parse(&handle)
    }

    /// Fresh sandbox partition: `demo_` + 12 hex chars
    pub fn new_sandbox() -> Self {
        let bytes: [u8; 6] = rand::random();
        Self(format!("demo_{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Partition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<PartitionError> for AppError {
    fn from(e: PartitionError) -> Self {
        AppError::with_message(ErrorCode::PartitionInvalid, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_schema_style_handles() {
        assert!(Partition::parse("tenant_burgerjoint").is_ok());
        assert!(Partition::parse("demo_0a1b2c3d4e5f").is_ok());
        assert!(Partition::parse("a").is_ok());
    }

    #[test]
    fn rejects_injection_and_reserved_names() {
        assert_eq!(Partition::parse(""), Err(PartitionError::Empty));
        assert!(matches!(
            Partition::parse("tenant; DROP SCHEMA public"),
            Err(PartitionError::BadChar(_))
        ));
        assert!(matches!(
            Partition::parse("Tenant_a"),
            Err(PartitionError::BadStart(_))
        ));
        assert!(matches!(
            Partition::parse("1tenant"),
            Err(PartitionError::BadStart(_))
        ));
        assert!(matches!(
            Partition::parse("public"),
            Err(PartitionError::Reserved(_))
        ));
        assert!(matches!(
            Partition::parse("pg_temp_1"),
            Err(PartitionError::Reserved(_))
        ));
        assert_eq!(Partition::parse(&"a".repeat(64)), Err(PartitionError::TooLong));
    }

    #[test]
    fn tenant_names_become_handles() {
        let p = Partition::for_tenant_name("Joe's Burger Joint!").unwrap();
        assert_eq!(p.as_str(), "tenant_joesburgerjoint");
        assert!(Partition::for_tenant_name("!!!").is_err());
    }

    #[test]
    fn sandbox_handles_are_unique_and_valid() {
        let a = Partition::new_sandbox();
        let b = Partition::new_sandbox();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), "demo_".len() + 12);
        assert!(Partition::parse(a.as_str()).is_ok());
    }

    #[test]
    fn shared_namespace_is_not_a_tenant_handle() {
        assert!(Partition::shared().is_shared());
        assert!(Partition::parse(Partition::shared().as_str()).is_err());
    }
}
