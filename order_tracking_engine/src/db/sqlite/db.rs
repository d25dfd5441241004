use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::{archive, db_url, investments, markers, new_pool, orders};
use crate::{
    db::common::{
        ArchiveManagement,
        BulkStatusSummary,
        InvestmentManagement,
        MarkerManagement,
        OrderStore,
        StoreError,
    },
    db_types::{
        DeletedOrder,
        DeliveryStatus,
        Investment,
        NewInvestment,
        NewOrder,
        NewSettlementMarker,
        Order,
        OrderUpdate,
        Owner,
        SettlementMarker,
    },
    order_objects::{ArchiveQueryFilter, OrderQueryFilter},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, StoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Converges the physical schema to the effective uniqueness policy by dropping any unconditional unique
    /// index over `serial_number` left behind by an older schema. Returns the number of indexes dropped.
    ///
    /// The same repair also runs automatically when an exempt-owner insert trips a residual constraint; calling
    /// it at startup just gets the drift out of the way before the first write.
    pub async fn repair_legacy_serial_indexes(&self) -> Result<usize, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::drop_legacy_serial_indexes(&mut conn).await
    }
}

impl OrderStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let serial = order.serial_number.trim().to_string();
        if !order.owner.is_uniqueness_exempt() && orders::serial_in_use(&serial, &mut conn).await? {
            debug!("🗃️ Serial [{serial}] is already taken in the non-exempt domain. Rejecting order.");
            return Err(StoreError::DuplicateSerial(serial));
        }
        match orders::insert_order(order.clone(), &mut conn).await {
            Ok(order) => {
                debug!("🗃️ Order [{serial}] saved for {} with id {}", order.owner, order.id);
                Ok(order)
            },
            Err(StoreError::DriverError(e)) if StoreError::is_unique_violation(&e) => {
                if !order.owner.is_uniqueness_exempt() {
                    // We lost the check-then-act race. The partial index is the true enforcement point.
                    debug!("🗃️ Serial [{serial}] was taken concurrently. Rejecting order.");
                    return Err(StoreError::DuplicateSerial(serial));
                }
                warn!(
                    "🗃️ Exempt owner insert for [{serial}] hit a unique constraint. A legacy index is still \
                     present. Repairing and retrying once."
                );
                let dropped = orders::drop_legacy_serial_indexes(&mut conn).await?;
                debug!("🗃️ Index repair dropped {dropped} legacy index(es)");
                match orders::insert_order(order, &mut conn).await {
                    Ok(order) => {
                        debug!("🗃️ Order [{serial}] saved on retry with id {}", order.id);
                        Ok(order)
                    },
                    Err(StoreError::DriverError(e)) if StoreError::is_unique_violation(&e) => {
                        error!("🗃️ Unique constraint on [{serial}] persisted after index repair. Giving up.");
                        Err(StoreError::ConstraintRace(serial))
                    },
                    Err(e) => Err(e),
                }
            },
            Err(e) => Err(e),
        }
    }

    async fn order_by_id(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(id, &mut conn).await
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::search_orders(query, &mut conn).await
    }

    async fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        trace!("🗃️ Order {id} updating with new values: {update:?}");
        let order = orders::update_order(id, update, &mut conn).await?;
        trace!("🗃️ Order {id} has been updated.");
        Ok(order)
    }

    async fn bulk_update_status(
        &self,
        owner: Owner,
        serials: &[String],
        status: DeliveryStatus,
    ) -> Result<BulkStatusSummary, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut summary = BulkStatusSummary::default();
        for serial in serials {
            let changed = orders::set_status_for_serial(owner, serial, status, &mut tx).await?;
            if changed > 0 {
                summary.matched.push(serial.clone());
                summary.modified += changed;
            } else {
                summary.not_found.push(serial.clone());
            }
        }
        tx.commit().await?;
        debug!(
            "🗃️ Bulk status update for {owner}: {} matched, {} not found, {} rows set to {status}",
            summary.matched.len(),
            summary.not_found.len(),
            summary.modified
        );
        Ok(summary)
    }

    /// Archives and then removes the order in a single transaction. If the archive insert fails, the transaction
    /// is rolled back and the order remains live.
    async fn delete_order(&self, id: i64) -> Result<DeletedOrder, StoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_id(id, &mut tx).await?.ok_or(StoreError::OrderNotFound(id))?;
        let archived = archive::insert_archived(&order, &mut tx).await?;
        orders::delete_order_row(id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {id} [{}] archived as record {} and removed", order.serial_number, archived.id);
        Ok(archived)
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl ArchiveManagement for SqliteDatabase {
    async fn archived_orders(&self, query: ArchiveQueryFilter) -> Result<Vec<DeletedOrder>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        archive::fetch_archived(query, &mut conn).await
    }

    async fn purge_archive(&self) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let purged = archive::purge(&mut conn).await?;
        debug!("🗄️ Purged {purged} archived orders");
        Ok(purged)
    }
}

impl MarkerManagement for SqliteDatabase {
    async fn create_marker(&self, marker: NewSettlementMarker) -> Result<SettlementMarker, StoreError> {
        let mut conn = self.pool.acquire().await?;
        markers::insert_marker(marker, &mut conn).await
    }

    async fn delete_marker(&self, id: i64) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        if markers::delete_marker(id, &mut conn).await? {
            debug!("📍️ Marker {id} removed");
            Ok(())
        } else {
            Err(StoreError::MarkerNotFound(id))
        }
    }

    async fn fetch_markers(&self, owner: Option<Owner>) -> Result<Vec<SettlementMarker>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        markers::fetch_markers(owner, &mut conn).await
    }
}

impl InvestmentManagement for SqliteDatabase {
    async fn record_investment(&self, investment: NewInvestment) -> Result<Investment, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let record = investments::insert_investment(investment, &mut conn).await?;
        debug!("💰️ Investment {} of {} recorded for source {}", record.id, record.amount, record.source);
        Ok(record)
    }

    async fn fetch_investments(
        &self,
        source: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Investment>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        investments::fetch_investments(source, limit, &mut conn).await
    }
}
