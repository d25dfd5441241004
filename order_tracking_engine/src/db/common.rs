//! Database management and control.
//!
//! This module defines the interface contracts that database backends need to expose in order to be supported by
//! the order tracking engine.
//!
//! * [`OrderStore`] owns the order lifecycle and is the single enforcement point for the conditional serial number
//!   uniqueness policy.
//! * [`ArchiveManagement`] queries the append-only record of deleted orders. The archive is written to only as a
//!   side effect of [`OrderStore::delete_order`].
//! * [`MarkerManagement`] owns the settlement marker lifecycle. Markers hold a non-owning reference to an order.
//! * [`InvestmentManagement`] is thin CRUD for recorded investment amounts.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
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

/// The per-request outcome report of a bulk status update. Serials that matched at least one order appear in
/// `matched`; the rest appear in `not_found`. `modified` is the number of rows actually changed, which can exceed
/// `matched.len()` when the exempt owner has several orders sharing one serial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusSummary {
    pub matched: Vec<String>,
    pub not_found: Vec<String>,
    pub modified: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Duplicate serial not allowed for non-exempt owners: {0}")]
    DuplicateSerial(String),
    #[error("Order not found: {0}")]
    OrderNotFound(i64),
    #[error("Settlement marker not found: {0}")]
    MarkerNotFound(i64),
    #[error("Marker anchor order not found: {0}")]
    AnchorOrderNotFound(i64),
    #[error("Marker for {marker_owner} cannot anchor to an order belonging to {order_owner}")]
    AnchorOwnerMismatch { marker_owner: Owner, order_owner: Owner },
    #[error("Unique constraint violation persisted after index repair: {0}")]
    ConstraintRace(String),
}

impl StoreError {
    /// Collapses the underlying persistence failure modes into the single retryable-vs-fatal distinction that
    /// callers get to see. Everything that is not a transient driver condition is fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::DriverError(sqlx::Error::PoolTimedOut) => true,
            StoreError::DriverError(sqlx::Error::Io(_)) => true,
            StoreError::DriverError(sqlx::Error::Database(db)) => db.message().contains("database is locked"),
            _ => false,
        }
    }

    pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
        err.as_database_error().map(|db| db.is_unique_violation()).unwrap_or(false)
    }
}

#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Inserts a brand-new order.
    ///
    /// For a non-exempt owner, the store rejects the order with [`StoreError::DuplicateSerial`] when any existing
    /// order under a non-exempt owner carries the same trimmed serial number. The application-level check is an
    /// early, friendly rejection only; the true enforcement point is the partial unique index on
    /// `normalized_serial`, so a lost race also surfaces as `DuplicateSerial`.
    ///
    /// For the exempt owner no duplicate check is performed. If the insert trips a unique constraint anyway (a
    /// residual unconditional index from an older schema), the store repairs its indexes and retries the write
    /// exactly once before giving up with [`StoreError::ConstraintRace`].
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn order_by_id(&self, id: i64) -> Result<Option<Order>, StoreError>;

    /// Fetches orders according to the criteria in the filter, ordered by `order_date` descending.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError>;

    /// Applies a partial update to the order with the given id.
    async fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Order, StoreError>;

    /// Updates the delivery status on every order of `owner` matching any of the given serials. Serials are
    /// expected to be trimmed and deduplicated already (see `SerialList::normalized`). The whole batch runs in one
    /// transaction; individual serials that match nothing are reported, not failed.
    async fn bulk_update_status(
        &self,
        owner: Owner,
        serials: &[String],
        status: DeliveryStatus,
    ) -> Result<BulkStatusSummary, StoreError>;

    /// Archives and then removes the order with the given id, atomically from the caller's perspective. If the
    /// archive write fails the removal does not proceed and the order remains live.
    async fn delete_order(&self, id: i64) -> Result<DeletedOrder, StoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[allow(async_fn_in_trait)]
pub trait ArchiveManagement {
    /// Fetches archived orders, most recently deleted first.
    async fn archived_orders(&self, query: ArchiveQueryFilter) -> Result<Vec<DeletedOrder>, StoreError>;

    /// Removes every archive record, returning the number purged.
    async fn purge_archive(&self) -> Result<u64, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait MarkerManagement {
    /// Places a new settlement marker. The anchor order must exist at creation time and belong to the marker's
    /// owner; it is not re-validated afterwards.
    async fn create_marker(&self, marker: NewSettlementMarker) -> Result<SettlementMarker, StoreError>;

    async fn delete_marker(&self, id: i64) -> Result<(), StoreError>;

    /// Fetches markers, oldest first. Pass `None` to fetch markers for all owners.
    async fn fetch_markers(&self, owner: Option<Owner>) -> Result<Vec<SettlementMarker>, StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait InvestmentManagement {
    async fn record_investment(&self, investment: NewInvestment) -> Result<Investment, StoreError>;

    /// Fetches investment records, most recent first. The limit is clamped to 1..=500 and defaults to 50.
    async fn fetch_investments(
        &self,
        source: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Investment>, StoreError>;
}
