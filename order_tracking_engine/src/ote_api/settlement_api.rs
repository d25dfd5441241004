use std::fmt::Debug;

use log::*;
use ots_common::Pkr;

use crate::{
    db::common::{MarkerManagement, OrderStore},
    db_types::{NewSettlementMarker, Owner, SettlementMarker},
    order_objects::OrderQueryFilter,
    ote_api::errors::SettlementApiError,
    settlement::{compute_settlements, SettlementBucket},
};

/// `SettlementApi` manages settlement markers and derives payout buckets from them.
///
/// Reports are recomputed on every call from a fresh snapshot of the order and marker stores; nothing derived is
/// persisted. The two reads are not transactional, which is fine: staleness between them is tolerated and simply
/// reflected in the next computation.
pub struct SettlementApi<B> {
    db: B,
    rate: Pkr,
}

impl<B> Debug for SettlementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi (rate: {})", self.rate)
    }
}

impl<B> SettlementApi<B> {
    /// Creates the API with the configured earnings rate, in PKR per delivered order.
    pub fn new(db: B, rate: Pkr) -> Self {
        Self { db, rate }
    }

    pub fn rate(&self) -> Pkr {
        self.rate
    }
}

impl<B> SettlementApi<B>
where B: MarkerManagement
{
    /// Place a settlement marker immediately after the given order. The anchor must exist and belong to the
    /// marker's owner at creation time.
    pub async fn place_marker(&self, marker: NewSettlementMarker) -> Result<SettlementMarker, SettlementApiError> {
        let marker = self.db.create_marker(marker).await?;
        debug!("🔄️📍️ Marker {} placed for {} after order {}", marker.id, marker.owner, marker.after_order_id);
        Ok(marker)
    }

    pub async fn remove_marker(&self, id: i64) -> Result<(), SettlementApiError> {
        self.db.delete_marker(id).await?;
        debug!("🔄️📍️ Marker {id} removed");
        Ok(())
    }

    pub async fn markers_for_owner(&self, owner: Option<Owner>) -> Result<Vec<SettlementMarker>, SettlementApiError> {
        Ok(self.db.fetch_markers(owner).await?)
    }
}

impl<B> SettlementApi<B>
where B: MarkerManagement + OrderStore
{
    /// Compute the settlement buckets for an owner from the current state of both stores.
    pub async fn settlement_report(&self, owner: Owner) -> Result<Vec<SettlementBucket>, SettlementApiError> {
        let orders = self.db.search_orders(OrderQueryFilter::default().with_owner(owner)).await?;
        let markers = self.db.fetch_markers(Some(owner)).await?;
        let buckets = compute_settlements(&orders, &markers, self.rate);
        trace!(
            "🔄️📍️ Settlement report for {owner}: {} orders, {} markers, {} buckets",
            orders.len(),
            markers.len(),
            buckets.len()
        );
        Ok(buckets)
    }
}
