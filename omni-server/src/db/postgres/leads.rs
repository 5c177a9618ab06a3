use shared::models::Lead;
use shared::util::now_millis;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{LeadCreate, RepoResult};

pub async fn create(pool: &PgPool, lead: LeadCreate) -> RepoResult<Lead> {
    Ok(sqlx::query_as(
        "INSERT INTO public.leads (id, name, email, business_name, schema_name, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&lead.name)
    .bind(&lead.email)
    .bind(&lead.business_name)
    .bind(lead.partition.as_str())
    .bind(now_millis())
    .fetch_one(pool)
    .await?)
}
