use std::fmt::Debug;

use log::*;

use crate::{
    db::common::{ArchiveManagement, BulkStatusSummary, InvestmentManagement, OrderStore},
    db_types::{
        DeletedOrder,
        DeliveryStatus,
        Investment,
        NewInvestment,
        NewOrder,
        Order,
        OrderUpdate,
        Owner,
    },
    order_objects::{ArchiveQueryFilter, OrderQueryFilter, SerialList},
    ote_api::errors::OrderApiError,
};

/// `OrderApi` is the primary API for the order lifecycle: creation under the conditional uniqueness policy,
/// filtered reads, single and bulk status updates, and archive-then-remove deletion.
pub struct OrderApi<B> {
    db: B,
}

impl<B> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi")
    }
}

impl<B> OrderApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderApi<B>
where B: OrderStore
{
    /// Submit a brand-new order.
    ///
    /// The serial number must be non-empty after trimming. The conditional uniqueness policy is applied by the
    /// store: a duplicate serial inside the non-exempt domain is rejected, while the exempt owner may duplicate
    /// freely.
    pub async fn process_new_order(&self, order: NewOrder) -> Result<Order, OrderApiError> {
        if order.serial_number.trim().is_empty() {
            return Err(OrderApiError::ValidationError("serial number must not be empty".to_string()));
        }
        let order = self.db.create_order(order).await?;
        debug!("🔄️📦️ Order [{}] processing complete for {}", order.serial_number, order.owner);
        Ok(order)
    }

    pub async fn order_by_id(&self, id: i64) -> Result<Option<Order>, OrderApiError> {
        Ok(self.db.order_by_id(id).await?)
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError> {
        trace!("🔄️📦️ Searching orders. {query}");
        Ok(self.db.search_orders(query).await?)
    }

    /// Apply a partial update to an order. An update with no fields set is rejected before touching the store.
    pub async fn modify_order(&self, id: i64, update: OrderUpdate) -> Result<Order, OrderApiError> {
        if update.is_empty() {
            return Err(OrderApiError::ValidationError("no fields to update".to_string()));
        }
        if update.new_serial_number.as_deref().map(|s| s.trim().is_empty()).unwrap_or(false) {
            return Err(OrderApiError::ValidationError("serial number must not be empty".to_string()));
        }
        let order = self.db.update_order(id, update).await?;
        debug!("🔄️📦️ Order {id} updated");
        Ok(order)
    }

    /// Update the delivery status on every order of `owner` matching the given serials. The serial list is
    /// normalized here (split, trimmed, deduplicated); an input that normalizes to nothing is a validation error,
    /// but serials matching no orders are reported per-element, never failed.
    pub async fn bulk_status_update(
        &self,
        owner: Owner,
        serials: &SerialList,
        status: DeliveryStatus,
    ) -> Result<BulkStatusSummary, OrderApiError> {
        let serials = serials.normalized();
        if serials.is_empty() {
            return Err(OrderApiError::ValidationError("no serial numbers supplied".to_string()));
        }
        let summary = self.db.bulk_update_status(owner, &serials, status).await?;
        debug!(
            "🔄️📦️ Bulk update for {owner} complete. {}/{} serials matched, {} orders set to {status}",
            summary.matched.len(),
            serials.len(),
            summary.modified
        );
        Ok(summary)
    }

    /// Archive and remove an order. On success the returned record carries the full pre-delete snapshot; on any
    /// failure the order is still live.
    pub async fn delete_order(&self, id: i64) -> Result<DeletedOrder, OrderApiError> {
        let archived = self.db.delete_order(id).await?;
        debug!("🔄️📦️ Order {id} deleted and archived as record {}", archived.id);
        Ok(archived)
    }
}

impl<B> OrderApi<B>
where B: ArchiveManagement
{
    pub async fn archived_orders(&self, query: ArchiveQueryFilter) -> Result<Vec<DeletedOrder>, OrderApiError> {
        Ok(self.db.archived_orders(query).await?)
    }

    pub async fn purge_archive(&self) -> Result<u64, OrderApiError> {
        Ok(self.db.purge_archive().await?)
    }
}

impl<B> OrderApi<B>
where B: InvestmentManagement
{
    pub async fn record_investment(&self, investment: NewInvestment) -> Result<Investment, OrderApiError> {
        if investment.amount.value() < 0 {
            return Err(OrderApiError::ValidationError("amount must be a non-negative number".to_string()));
        }
        Ok(self.db.record_investment(investment).await?)
    }

    pub async fn investments(
        &self,
        source: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Investment>, OrderApiError> {
        Ok(self.db.fetch_investments(source, limit).await?)
    }
}
