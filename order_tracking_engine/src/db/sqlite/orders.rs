use chrono::Utc;
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, SqliteConnection};

use crate::{
    db::common::StoreError,
    db_types::{DeliveryStatus, NewOrder, Order, OrderUpdate, Owner},
    order_objects::OrderQueryFilter,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// Non-exempt owners get their trimmed serial copied into `normalized_serial`, which the partial unique index
/// covers. Exempt owners leave the column NULL and thus fall outside the constraint.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let order_date = order.order_date.unwrap_or_else(Utc::now);
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                serial_number,
                normalized_serial,
                owner,
                order_date
            ) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order.serial_number.trim().to_string())
    .bind(order.normalized_serial())
    .bind(order.owner)
    .bind(order_date)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Checks whether the trimmed serial is already taken inside the shared non-exempt uniqueness domain. Exempt
/// owners' orders never populate `normalized_serial`, so they are excluded from the check by construction.
pub async fn serial_in_use(serial: &str, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let taken: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE normalized_serial = $1)")
        .bind(serial.trim())
        .fetch_one(conn)
        .await?;
    Ok(taken != 0)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `order_date` in descending order, newest first, with the row id as tiebreak.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, StoreError> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
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
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let mut statuses = vec![];
        query.status.as_ref().unwrap().iter().for_each(|s| {
            statuses.push(format!("'{s}'"));
        });
        let status_clause = statuses.join(",");
        where_clause.push(format!("delivery_status IN ({status_clause})"));
    }
    if let Some(since) = query.since {
        where_clause.push("order_date >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("order_date <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY order_date DESC, id DESC");

    trace!("📋️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("📋️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

pub(crate) async fn update_order(
    id: i64,
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let existing = fetch_order_by_id(id, &mut *conn).await?.ok_or(StoreError::OrderNotFound(id))?;
    if update.is_empty() {
        // Nothing to change. The api layer rejects empty updates before we get here.
        return Ok(existing);
    }
    let new_serial = update.new_serial_number.map(|s| s.trim().to_string());
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(serial) = new_serial.clone() {
        set_clause.push("serial_number = ");
        set_clause.push_bind_unseparated(serial.clone());
        set_clause.push("normalized_serial = ");
        set_clause.push_bind_unseparated(existing.owner.normalized_serial(&serial));
    }
    if let Some(status) = update.new_status {
        set_clause.push("delivery_status = ");
        set_clause.push_bind_unseparated(status);
    }
    if let Some(order_date) = update.new_order_date {
        set_clause.push("order_date = ");
        set_clause.push_bind_unseparated(order_date);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("📋️ Executing query: {}", builder.sql());
    let updated = builder
        .build()
        .fetch_optional(conn)
        .await
        .map_err(|e| {
            if StoreError::is_unique_violation(&e) {
                StoreError::DuplicateSerial(new_serial.clone().unwrap_or_else(|| existing.serial_number.clone()))
            } else {
                StoreError::from(e)
            }
        })?
        .map(|row: SqliteRow| Order::from_row(&row))
        .transpose()?;
    updated.ok_or(StoreError::OrderNotFound(id))
}

/// Sets the delivery status on every order of `owner` carrying the given trimmed serial, returning the number of
/// rows changed. The exempt owner may hold several orders with the same serial, so this can be greater than one.
pub(crate) async fn set_status_for_serial(
    owner: Owner,
    serial: &str,
    status: DeliveryStatus,
    conn: &mut SqliteConnection,
) -> Result<u64, StoreError> {
    let result = sqlx::query(
        "UPDATE orders SET delivery_status = $1, updated_at = CURRENT_TIMESTAMP WHERE owner = $2 AND \
         TRIM(serial_number) = $3",
    )
    .bind(status)
    .bind(owner)
    .bind(serial)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_order_row(id: i64, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Drops every unconditional unique index over `serial_number` left behind by an older schema. The effective
/// policy is carried by the partial index on `normalized_serial` (partial indexes are skipped here), so anything
/// this finds is constraint drift that blocks the exempt owner's duplicates.
pub(crate) async fn drop_legacy_serial_indexes(conn: &mut SqliteConnection) -> Result<usize, StoreError> {
    let indexes = sqlx::query("PRAGMA index_list('orders')").fetch_all(&mut *conn).await?;
    let mut dropped = 0;
    for index in indexes {
        let name: String = index.try_get("name")?;
        let unique: i64 = index.try_get("unique")?;
        let origin: String = index.try_get("origin")?;
        let partial: i64 = index.try_get("partial")?;
        if unique == 0 || origin != "c" || partial != 0 {
            continue;
        }
        let columns = sqlx::query(&format!("PRAGMA index_info('{name}')")).fetch_all(&mut *conn).await?;
        let covers_serial = columns
            .iter()
            .any(|c| c.try_get::<Option<String>, _>("name").ok().flatten().as_deref() == Some("serial_number"));
        if covers_serial {
            sqlx::query(&format!("DROP INDEX \"{name}\"")).execute(&mut *conn).await?;
            debug!("🗃️ Dropped legacy unique index on serial_number: {name}");
            dropped += 1;
        }
    }
    Ok(dropped)
}
