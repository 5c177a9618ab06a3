//! Tenant Model
//!
//! Tenants live in the shared namespace. Each owns exactly one partition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default storefront color when a tenant has no theme override
pub const DEFAULT_PRIMARY_COLOR: &str = "#000000";
/// Default storefront preset
pub const DEFAULT_PRESET: &str = "mono-luxe";
/// Default storefront font
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Tenant entity (shared namespace)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// Partition handle (schema name)
    pub schema_name: String,
    /// Public hostname, `None` for sandbox tenants
    pub domain: Option<String>,
    pub is_sandbox: bool,
    pub theme_config: serde_json::Value,
    /// Unix millis
    pub created_at: i64,
}

impl Tenant {
    fn theme_str(&self, key: &str) -> Option<&str> {
        self.theme_config.get(key).and_then(|v| v.as_str())
    }

    pub fn primary_color(&self) -> &str {
        self.theme_str("primary_color")
            .unwrap_or(DEFAULT_PRIMARY_COLOR)
    }

    pub fn preset(&self) -> &str {
        self.theme_str("preset").unwrap_or(DEFAULT_PRESET)
    }

    pub fn font_family(&self) -> &str {
        self.theme_str("font_family").unwrap_or(DEFAULT_FONT_FAMILY)
    }
}

/// Create tenant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCreate {
    pub name: String,
    pub schema_name: String,
    pub domain: Option<String>,
    pub is_sandbox: bool,
    pub theme_config: serde_json::Value,
}

/// GET /api/v1/store/config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfigResponse {
    pub name: String,
    pub primary_color: String,
    pub preset: String,
    pub font_family: String,
    pub currency: String,
    pub theme: serde_json::Value,
}

impl From<&Tenant> for TenantConfigResponse {
    fn from(tenant: &Tenant) -> Self {
        Self {
            name: tenant.name.clone(),
            primary_color: tenant.primary_color().to_string(),
            preset: tenant.preset().to_string(),
            font_family: tenant.font_family().to_string(),
            currency: "$".to_string(),
            theme: tenant.theme_config.clone(),
        }
    }
}

/// POST /api/v1/sys/provision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default = "default_true")]
    pub seed_data: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResponse {
    pub id: Uuid,
    pub schema_name: String,
    pub message: String,
}

/// POST /api/v1/sys/generate-demo-session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSessionRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub business_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSessionResponse {
    pub token: String,
    pub schema_name: String,
    /// Host the sandbox storefront is served from
    pub demo_host: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// POST /api/v1/sys/reset-demo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetDemoResponse {
    pub schema_name: String,
    pub orders_removed: u64,
    pub message: String,
}

/// Write-once sandbox visitor record (shared namespace)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub business_name: Option<String>,
    pub schema_name: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(theme: serde_json::Value) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Burger Joint".to_string(),
            schema_name: "tenant_burgerjoint".to_string(),
            domain: Some("burger.test".to_string()),
            is_sandbox: false,
            theme_config: theme,
            created_at: 0,
        }
    }

    #[test]
    fn config_falls_back_to_defaults() {
        let cfg = TenantConfigResponse::from(&tenant(serde_json::json!({})));
        assert_eq!(cfg.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(cfg.preset, DEFAULT_PRESET);
        assert_eq!(cfg.font_family, DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn config_uses_theme_overrides() {
        let cfg = TenantConfigResponse::from(&tenant(
            serde_json::json!({"primary_color": "#ff5500", "preset": "street"}),
        ));
        assert_eq!(cfg.primary_color, "#ff5500");
        assert_eq!(cfg.preset, "street");
    }

    #[test]
    fn provision_seeds_by_default() {
        let req: ProvisionRequest =
            serde_json::from_str(r#"{"name":"Taco Town","domain":"tacos.test"}"#).unwrap();
        assert!(req.seed_data);
        assert!(req.primary_color.is_none());
    }
}
