use shared::models::{Tenant, TenantCreate};
use shared::util::now_millis;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::RepoResult;

pub async fn find_by_domain(pool: &PgPool, domain: &str) -> RepoResult<Option<Tenant>> {
    Ok(sqlx::query_as("SELECT * FROM public.tenants WHERE domain = $1")
        .bind(domain)
        .fetch_optional(pool)
        .await?)
}

pub async fn find_by_schema(pool: &PgPool, schema_name: &str) -> RepoResult<Option<Tenant>> {
    Ok(
        sqlx::query_as("SELECT * FROM public.tenants WHERE schema_name = $1")
            .bind(schema_name)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn create(pool: &PgPool, data: TenantCreate) -> RepoResult<Tenant> {
    Ok(sqlx::query_as(
        "INSERT INTO public.tenants (id, name, schema_name, domain, is_sandbox, theme_config, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&data.name)
    .bind(&data.schema_name)
    .bind(&data.domain)
    .bind(data.is_sandbox)
    .bind(&data.theme_config)
    .bind(now_millis())
    .fetch_one(pool)
    .await?)
}
