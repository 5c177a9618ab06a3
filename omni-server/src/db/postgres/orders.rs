use chrono::NaiveDate;
use shared::order::{LineSnapshot, OrderStatus, OrderView};
use shared::util::now_millis;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::table;
use crate::db::{NewOrder, RepoError, RepoResult};
use crate::tenant::Partition;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    ticket_number: i32,
    business_day: NaiveDate,
    customer_name: String,
    table_number: Option<String>,
    status: String,
    total_amount: i64,
    items: Json<Vec<LineSnapshot>>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for OrderView {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(OrderView {
            id: row.id,
            ticket_number: row.ticket_number,
            customer_name: row.customer_name,
            table_number: row.table_number,
            status,
            total_amount: row.total_amount,
            items: row.items.0,
            business_day: row.business_day,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Increment the `(partition, day)` counter row and return the new ticket.
///
/// The upsert takes a row lock, so concurrent callers serialize on it until
/// their transaction ends.
async fn take_ticket(
    conn: &mut PgConnection,
    partition: &Partition,
    day: NaiveDate,
) -> RepoResult<i32> {
    let counters = table(partition, "ticket_counters");
    let sql = format!(
        r#"
        INSERT INTO {counters} AS c (business_day, last_ticket, updated_at)
        VALUES ($1, 1, $2)
        ON CONFLICT (business_day) DO UPDATE SET
            last_ticket = c.last_ticket + 1,
            updated_at = EXCLUDED.updated_at
        RETURNING last_ticket
        "#
    );
    let row: (i32,) = sqlx::query_as(&sql)
        .bind(day)
        .bind(now_millis())
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.0)
}

pub async fn insert_with_ticket(
    pool: &PgPool,
    partition: &Partition,
    order: NewOrder,
) -> RepoResult<OrderView> {
    let sql = format!(
        "INSERT INTO {} (id, ticket_number, business_day, customer_name, table_number,
                         status, total_amount, items, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
         RETURNING *",
        table(partition, "orders")
    );

    let mut tx = pool.begin().await?;
    let ticket = take_ticket(&mut tx, partition, order.business_day).await?;
    let row: OrderRow = sqlx::query_as(&sql)
        .bind(order.id)
        .bind(ticket)
        .bind(order.business_day)
        .bind(&order.customer_name)
        .bind(&order.table_number)
        .bind(OrderStatus::Pending.as_str())
        .bind(order.total_amount)
        .bind(Json(&order.items))
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    row.try_into()
}

pub async fn find(pool: &PgPool, partition: &Partition, id: Uuid) -> RepoResult<Option<OrderView>> {
    let sql = format!("SELECT * FROM {} WHERE id = $1", table(partition, "orders"));
    let row: Option<OrderRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    row.map(OrderView::try_from).transpose()
}

pub async fn list_active(pool: &PgPool, partition: &Partition) -> RepoResult<Vec<OrderView>> {
    let sql = format!(
        "SELECT * FROM {} WHERE status <> $1 ORDER BY created_at, ticket_number",
        table(partition, "orders")
    );
    let rows: Vec<OrderRow> = sqlx::query_as(&sql)
        .bind(OrderStatus::Completed.as_str())
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(OrderView::try_from).collect()
}

pub async fn compare_and_set_status(
    pool: &PgPool,
    partition: &Partition,
    id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
) -> RepoResult<Option<OrderView>> {
    let orders = table(partition, "orders");
    let sql = format!(
        "UPDATE {orders} SET status = $1, updated_at = $2
         WHERE id = $3 AND status = $4
         RETURNING *"
    );
    let row: Option<OrderRow> = sqlx::query_as(&sql)
        .bind(next.as_str())
        .bind(now_millis())
        .bind(id)
        .bind(expected.as_str())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_into()?)),
        None => {
            let exists: Option<(Uuid,)> =
                sqlx::query_as(&format!("SELECT id FROM {orders} WHERE id = $1"))
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
            match exists {
                Some(_) => Ok(None),
                None => Err(RepoError::NotFound(format!("order {id}"))),
            }
        }
    }
}

pub async fn purge(conn: &mut PgConnection, partition: &Partition) -> RepoResult<u64> {
    let removed = sqlx::query(&format!("DELETE FROM {}", table(partition, "orders")))
        .execute(&mut *conn)
        .await?
        .rows_affected();
    sqlx::query(&format!(
        "DELETE FROM {}",
        table(partition, "ticket_counters")
    ))
    .execute(&mut *conn)
    .await?;
    Ok(removed)
}
