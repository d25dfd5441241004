use log::debug;
use sqlx::SqliteConnection;

use super::orders;
use crate::{
    db::common::StoreError,
    db_types::{NewSettlementMarker, Owner, SettlementMarker, DEFAULT_MARKER_LABEL},
};

/// Inserts a new settlement marker. The anchor order must exist and belong to the marker's owner at creation
/// time; the reference is never re-validated afterwards, so markers may dangle once the anchor is deleted.
pub(crate) async fn insert_marker(
    marker: NewSettlementMarker,
    conn: &mut SqliteConnection,
) -> Result<SettlementMarker, StoreError> {
    let anchor = orders::fetch_order_by_id(marker.after_order_id, &mut *conn)
        .await?
        .ok_or(StoreError::AnchorOrderNotFound(marker.after_order_id))?;
    if anchor.owner != marker.owner {
        return Err(StoreError::AnchorOwnerMismatch { marker_owner: marker.owner, order_owner: anchor.owner });
    }
    let label = marker.label.unwrap_or_else(|| DEFAULT_MARKER_LABEL.to_string());
    let marker: SettlementMarker = sqlx::query_as(
        r#"
            INSERT INTO settlement_markers (owner, after_order_id, label)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(marker.owner)
    .bind(marker.after_order_id)
    .bind(label)
    .fetch_one(conn)
    .await?;
    debug!("📍️ Marker [{}] placed after order {} for {}", marker.id, marker.after_order_id, marker.owner);
    Ok(marker)
}

pub(crate) async fn delete_marker(id: i64, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM settlement_markers WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Fetches markers, oldest first so that longstanding settlement boundaries keep a stable position in reports.
pub async fn fetch_markers(
    owner: Option<Owner>,
    conn: &mut SqliteConnection,
) -> Result<Vec<SettlementMarker>, StoreError> {
    let markers = match owner {
        Some(owner) => {
            sqlx::query_as("SELECT * FROM settlement_markers WHERE owner = $1 ORDER BY created_at ASC, id ASC")
                .bind(owner)
                .fetch_all(conn)
                .await?
        },
        None => {
            sqlx::query_as("SELECT * FROM settlement_markers ORDER BY created_at ASC, id ASC")
                .fetch_all(conn)
                .await?
        },
    };
    Ok(markers)
}
