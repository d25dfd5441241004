//! Order Tracking Engine
//!
//! The Order Tracking Engine is the backend library for a reseller order tracking and settlement system. It keeps a
//! record of shipped orders per reseller ("owner"), enforces the owner-conditional serial number uniqueness policy,
//! archives deleted orders, and reconciles delivered orders into periodic cash settlements using user-placed markers.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly. Instead, use the public API provided by the engine. The exception is the data types used
//!    in the database. These are defined in the `db_types` module and are public.
//! 2. The settlement engine ([`mod@settlement`]). A pure function over an (orders, markers) snapshot that partitions
//!    the order history into payout buckets. It has no persistence of its own and is recomputed on demand.
//! 3. The engine public API (`ote_api`). This provides the public-facing functionality of the engine: order flow,
//!    archive queries, marker placement and settlement reports. Specific backends need to implement the traits in
//!    the `db` module in order to act as a backend for the Order Tracking Server.
mod db;

pub mod db_types;
mod ote_api;
pub mod settlement;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase, MIGRATOR};
pub use db::common::{
    ArchiveManagement,
    InvestmentManagement,
    MarkerManagement,
    OrderStore,
    StoreError,
};
pub use ote_api::{
    errors::{OrderApiError, SettlementApiError},
    order_objects,
    orders_api::OrderApi,
    settlement_api::SettlementApi,
};
