//! Platform endpoints
//!
//! POST /api/v1/sys/generate-demo-session: ephemeral sandbox + session token
//! POST /api/v1/sys/reset-demo: wipe orders and reseed a sandbox catalog
//! POST /api/v1/sys/provision: super-admin tenant onboarding

use axum::{Extension, Json, extract::State};
use serde_json::{Map, Value};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DemoSessionRequest, DemoSessionResponse, ProvisionRequest, ProvisionResponse,
    ResetDemoResponse, TenantCreate,
};

use super::ApiResult;
use crate::auth::SessionGrant;
use crate::db::{CatalogSeed, LeadCreate, RepoError};
use crate::state::AppState;
use crate::tenant::{Partition, TenantContext, normalize_host};

fn required(field: &'static str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", field));
    }
    Ok(value.to_string())
}

// ── POST /api/v1/sys/generate-demo-session ──

pub async fn generate_demo_session(
    State(state): State<AppState>,
    Json(req): Json<DemoSessionRequest>,
) -> ApiResult<DemoSessionResponse> {
    let name = required("name", &req.name)?;
    let email = required("email", &req.email)?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email"));
    }
    let business_name = req
        .business_name
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string);

    let partition = Partition::new_sandbox();
    let display_name = business_name
        .clone()
        .unwrap_or_else(|| format!("{name}'s Kitchen"));

    state
        .directory
        .register(TenantCreate {
            name: display_name,
            schema_name: partition.to_string(),
            domain: None,
            is_sandbox: true,
            theme_config: Value::Object(Map::new()),
        })
        .await?;
    state
        .repos
        .catalog
        .insert_seed(&partition, &CatalogSeed::demo())
        .await?;
    state
        .repos
        .leads
        .record(LeadCreate {
            name: name.clone(),
            email: email.clone(),
            business_name,
            partition: partition.clone(),
        })
        .await?;

    let token = state.tokens.issue(SessionGrant {
        subject: format!("demo:{partition}"),
        email: Some(email),
        name: Some(name),
        target_partition: Some(partition.to_string()),
    })?;

    tracing::info!(partition = %partition, "Demo session created");

    Ok(Json(DemoSessionResponse {
        token,
        schema_name: partition.to_string(),
        demo_host: state.config.demo_domain.clone(),
        expires_in: state.tokens.ttl_secs(),
    }))
}

// ── POST /api/v1/sys/reset-demo ──

pub async fn reset_demo(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> ApiResult<ResetDemoResponse> {
    let partition = ctx.require_sandbox()?;

    let orders_removed = state
        .repos
        .tenants
        .reset_partition(partition, &CatalogSeed::demo())
        .await?;

    tracing::info!(partition = %partition, orders_removed, "Sandbox reset");

    Ok(Json(ResetDemoResponse {
        schema_name: partition.to_string(),
        orders_removed,
        message: "Demo data reset".to_string(),
    }))
}

// ── POST /api/v1/sys/provision ──

pub async fn provision(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    Json(req): Json<ProvisionRequest>,
) -> ApiResult<ProvisionResponse> {
    let admin = ctx.require_superuser()?;

    let name = required("name", &req.name)?;
    let domain = normalize_host(&required("domain", &req.domain)?);
    if domain.is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", "domain"));
    }
    let partition = Partition::for_tenant_name(&name)?;

    let registered = state
        .directory
        .register(TenantCreate {
            name,
            schema_name: partition.to_string(),
            domain: Some(domain.clone()),
            is_sandbox: false,
            theme_config: theme_config(&req),
        })
        .await;
    let (tenant, partition) = match registered {
        Ok(registered) => registered,
        Err(RepoError::Duplicate(_)) => {
            return Err(registration_conflict(&state, &domain, &partition).await);
        }
        Err(e) => return Err(e.into()),
    };

    if req.seed_data {
        state
            .repos
            .catalog
            .insert_seed(&partition, &CatalogSeed::starter())
            .await?;
    }

    tracing::info!(
        tenant = %tenant.name,
        partition = %partition,
        admin = %admin.subject,
        "Tenant provisioned"
    );

    Ok(Json(ProvisionResponse {
        id: tenant.id,
        schema_name: tenant.schema_name,
        message: format!("Tenant provisioned at {domain}"),
    }))
}

/// Which unique key a rejected registration collided with
async fn registration_conflict(state: &AppState, domain: &str, partition: &Partition) -> AppError {
    match state.directory.by_host(domain).await {
        Ok(Some(_)) => AppError::new(ErrorCode::DomainTaken).with_detail("domain", domain),
        Ok(None) => AppError::new(ErrorCode::PartitionTaken)
            .with_detail("schemaName", partition.as_str()),
        Err(e) => e.into(),
    }
}

fn theme_config(req: &ProvisionRequest) -> Value {
    let mut theme = Map::new();
    if let Some(color) = req.primary_color.as_deref().filter(|c| !c.trim().is_empty()) {
        theme.insert("primary_color".into(), Value::String(color.trim().to_string()));
    }
    if let Some(font) = req.font_family.as_deref().filter(|f| !f.trim().is_empty()) {
        theme.insert("font_family".into(), Value::String(font.trim().to_string()));
    }
    Value::Object(theme)
}
