use log::trace;
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    db::common::StoreError,
    db_types::{DeletedOrder, Order},
    order_objects::ArchiveQueryFilter,
};

/// Writes the archive record for an order that is about to be removed. The snapshot is the full pre-delete order
/// state. Call this inside the same transaction as the removal so that a failed archive write leaves the order
/// live.
pub(crate) async fn insert_archived(order: &Order, conn: &mut SqliteConnection) -> Result<DeletedOrder, StoreError> {
    let archived = sqlx::query_as(
        r#"
            INSERT INTO deleted_orders (
                original_id,
                serial_number,
                owner,
                order_date,
                delivery_status,
                snapshot
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.id)
    .bind(order.serial_number.as_str())
    .bind(order.owner)
    .bind(order.order_date)
    .bind(order.delivery_status)
    .bind(Json(order.clone()))
    .fetch_one(conn)
    .await?;
    Ok(archived)
}

/// Fetches archive records matching the filter, most recently deleted first. Pagination is clamped by the filter
/// itself.
pub async fn fetch_archived(
    query: ArchiveQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<DeletedOrder>, StoreError> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM deleted_orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(owner) = query.owner {
        where_clause.push("owner = ");
        where_clause.push_bind_unseparated(owner);
    }
    if let Some(search) = query.serial_search {
        where_clause.push("serial_number LIKE ");
        where_clause.push_bind_unseparated(format!("%{search}%"));
    }
    builder.push(" ORDER BY deleted_at DESC, id DESC LIMIT ");
    builder.push_bind(query.pagination.effective_limit() as i64);
    builder.push(" OFFSET ");
    builder.push_bind(query.pagination.offset() as i64);

    trace!("🗄️ Executing query: {}", builder.sql());
    let records = builder.build_query_as::<DeletedOrder>().fetch_all(conn).await?;
    Ok(records)
}

/// Removes every archive record, returning the number purged.
pub(crate) async fn purge(conn: &mut SqliteConnection) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM deleted_orders").execute(conn).await?;
    Ok(result.rows_affected())
}
