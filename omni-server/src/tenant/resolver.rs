//! Tenant Resolver
//!
//! Turns `(Host, bearer token)` into a [`TenantContext`] by running an
//! ordered chain of [`ResolveStrategy`]s; the first strategy that claims the
//! request wins. The token, when present, is verified once before the chain
//! runs.
//!
//! ```text
//! SandboxTokenStrategy   demo host + session token with target_partition
//! AdminHostStrategy      admin host → shared namespace (super admins only)
//! HostLookupStrategy     tenant registered under the host
//! (fallback)             TenantNotFound
//! ```

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Uri, header},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::Tenant;

use super::{Partition, PartitionDirectory};
use crate::auth::{AuthMethod, Identity, TokenVerifier, bearer_token};
use crate::state::AppState;

/// Request-scoped tenant context; never persisted
#[derive(Debug, Clone, Serialize)]
pub struct TenantContext {
    pub partition: Partition,
    /// `None` for the shared namespace
    #[serde(skip)]
    pub tenant: Option<Tenant>,
    pub identity: Option<Identity>,
    pub is_superuser: bool,
}

impl TenantContext {
    pub fn auth_method(&self) -> Option<AuthMethod> {
        self.identity.as_ref().map(|i| i.method)
    }

    pub fn is_sandbox(&self) -> bool {
        self.tenant.as_ref().is_some_and(|t| t.is_sandbox)
    }

    /// The partition, provided it belongs to a tenant
    pub fn require_tenant_partition(&self) -> Result<&Partition, AppError> {
        if self.partition.is_shared() {
            return Err(AppError::with_message(
                ErrorCode::PermissionDenied,
                "The shared namespace has no catalog or orders",
            ));
        }
        Ok(&self.partition)
    }

    /// Caller identity allowed to operate this tenant's kitchen
    pub fn require_staff(&self) -> Result<&Identity, AppError> {
        let identity = self.identity.as_ref().ok_or_else(AppError::not_authenticated)?;
        let partition = self.require_tenant_partition()?;
        let granted = self.is_superuser
            || identity.target_partition.as_deref() == Some(partition.as_str())
            || identity.groups.iter().any(|g| g == partition.as_str());
        if !granted {
            tracing::info!(
                subject = %identity.subject,
                partition = %partition,
                "Staff access denied"
            );
            return Err(AppError::permission_denied(
                "Not a member of this restaurant",
            ));
        }
        Ok(identity)
    }

    pub fn require_superuser(&self) -> Result<&Identity, AppError> {
        let identity = self.identity.as_ref().ok_or_else(AppError::not_authenticated)?;
        if !self.is_superuser || !self.partition.is_shared() {
            return Err(AppError::new(ErrorCode::AdminRequired));
        }
        Ok(identity)
    }

    pub fn require_sandbox(&self) -> Result<&Partition, AppError> {
        let partition = self.require_tenant_partition()?;
        if !self.is_sandbox() {
            return Err(AppError::new(ErrorCode::SandboxOnly));
        }
        Ok(partition)
    }
}

/// Inputs every strategy sees
pub struct ResolveRequest<'a> {
    /// Lower-cased, port-stripped host
    pub host: &'a str,
    pub identity: Option<&'a Identity>,
}

#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` passes the request on to the next strategy
    async fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<TenantContext>, AppError>;
}

/// One host serving many sandboxes, told apart by the token's partition claim
pub struct SandboxTokenStrategy {
    pub demo_domain: String,
    pub directory: PartitionDirectory,
}

#[async_trait]
impl ResolveStrategy for SandboxTokenStrategy {
    fn name(&self) -> &'static str {
        "sandbox-token"
    }

    async fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<TenantContext>, AppError> {
        if req.host != self.demo_domain {
            return Ok(None);
        }
        let Some(identity) = req.identity else {
            return Ok(None);
        };
        let Some(claim) = identity.target_partition.as_deref() else {
            return Ok(None);
        };
        if identity.method != AuthMethod::SessionToken {
            return Ok(None);
        }

        let not_found = || {
            AppError::with_message(ErrorCode::TenantNotFound, "Sandbox not found")
                .with_detail("partition", claim.to_string())
        };
        let partition = Partition::parse(claim).map_err(|_| not_found())?;
        let tenant = self
            .directory
            .by_partition(&partition)
            .await?
            .filter(|t| t.is_sandbox)
            .ok_or_else(not_found)?;

        Ok(Some(TenantContext {
            partition,
            tenant: Some(tenant),
            identity: Some(identity.clone()),
            is_superuser: false,
        }))
    }
}

/// Admin host → shared namespace, allow-listed administrators only
pub struct AdminHostStrategy {
    pub admin_domain: String,
    /// Lower-cased emails
    pub super_admins: Vec<String>,
}

/// Allow-listed email on an identity-provider token. Session tokens carry
/// caller-supplied emails and never qualify.
fn is_allow_listed(super_admins: &[String], identity: &Identity) -> bool {
    identity.method == AuthMethod::InteractiveSso
        && identity
            .email
            .as_deref()
            .is_some_and(|e| super_admins.iter().any(|a| a.eq_ignore_ascii_case(e)))
}

#[async_trait]
impl ResolveStrategy for AdminHostStrategy {
    fn name(&self) -> &'static str {
        "admin-host"
    }

    async fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<TenantContext>, AppError> {
        if req.host != self.admin_domain {
            return Ok(None);
        }
        let identity = req.identity.ok_or_else(AppError::not_authenticated)?;
        if !is_allow_listed(&self.super_admins, identity) {
            tracing::warn!(
                subject = %identity.subject,
                email = identity.email.as_deref().unwrap_or("-"),
                "Non-admin on admin host"
            );
            return Err(AppError::new(ErrorCode::AdminRequired));
        }
        Ok(Some(TenantContext {
            partition: Partition::shared(),
            tenant: None,
            identity: Some(identity.clone()),
            is_superuser: true,
        }))
    }
}

/// Tenant registered under the request host
pub struct HostLookupStrategy {
    pub directory: PartitionDirectory,
}

#[async_trait]
impl ResolveStrategy for HostLookupStrategy {
    fn name(&self) -> &'static str {
        "host-lookup"
    }

    async fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<TenantContext>, AppError> {
        let Some(tenant) = self.directory.by_host(req.host).await? else {
            return Ok(None);
        };
        let partition = PartitionDirectory::partition_of(&tenant)?;
        Ok(Some(TenantContext {
            partition,
            tenant: Some(tenant),
            identity: req.identity.cloned(),
            is_superuser: false,
        }))
    }
}

pub struct TenantResolver {
    verifier: TokenVerifier,
    strategies: Vec<Box<dyn ResolveStrategy>>,
    super_admins: Vec<String>,
}

impl TenantResolver {
    /// Standard chain: sandbox token, admin host, host lookup
    pub fn new(
        verifier: TokenVerifier,
        directory: PartitionDirectory,
        demo_domain: &str,
        admin_domain: &str,
        super_admins: Vec<String>,
    ) -> Self {
        let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(SandboxTokenStrategy {
                demo_domain: normalize_host(demo_domain),
                directory: directory.clone(),
            }),
            Box::new(AdminHostStrategy {
                admin_domain: normalize_host(admin_domain),
                super_admins: super_admins.clone(),
            }),
            Box::new(HostLookupStrategy { directory }),
        ];
        Self {
            verifier,
            strategies,
            super_admins,
        }
    }

    pub async fn resolve(&self, host: &str, token: Option<&str>) -> Result<TenantContext, AppError> {
        let host = normalize_host(host);
        let identity = match token {
            Some(token) => Some(self.verifier.verify(token).await?),
            None => None,
        };
        let req = ResolveRequest {
            host: &host,
            identity: identity.as_ref(),
        };

        for strategy in &self.strategies {
            if let Some(mut ctx) = strategy.resolve(&req).await? {
                ctx.is_superuser |= ctx
                    .identity
                    .as_ref()
                    .is_some_and(|i| is_allow_listed(&self.super_admins, i));
                tracing::debug!(
                    host = %host,
                    partition = %ctx.partition,
                    strategy = strategy.name(),
                    "Tenant resolved"
                );
                return Ok(ctx);
            }
        }

        Err(
            AppError::with_message(ErrorCode::TenantNotFound, format!("no tenant for host: {host}"))
                .with_detail("host", host.clone()),
        )
    }
}

/// Lower-case and drop any `:port` (IPv6 literals keep their brackets)
pub fn normalize_host(raw: &str) -> String {
    let raw = raw.trim().to_ascii_lowercase();
    if raw.starts_with('[') {
        return match raw.find(']') {
            Some(end) => raw[..=end].to_string(),
            None => raw,
        };
    }
    match raw.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host.to_string(),
        _ => raw,
    }
}

/// Host of a request: `Host` header, else the URI authority
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Middleware resolving the tenant of every request it guards and storing
/// the [`TenantContext`] in request extensions.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = request_host(request.headers(), request.uri());
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    let ctx = state.resolver.resolve(&host, token.as_deref()).await?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
