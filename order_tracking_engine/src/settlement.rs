//! The settlement engine.
//!
//! A settlement partitions an owner's chronologically ordered order history into discrete payout buckets using
//! user-placed markers. Each marker sits immediately after its anchor order; its bucket holds every order older
//! than the anchor, down to (but not including) the next older marker's anchor. The last marker's bucket runs to
//! the end of the history.
//!
//! [`compute_settlements`] is a pure function over an (orders, markers) snapshot. It never mutates its inputs,
//! keeps no state, and is recomputed on demand by the callers that hold the stores.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use ots_common::Pkr;

use crate::db_types::{DeliveryStatus, Order, SettlementMarker};

//--------------------------------------     BucketStats      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStats {
    pub total: usize,
    pub delivered: usize,
    pub pending: usize,
    pub cancelled: usize,
    pub in_transit: usize,
}

impl BucketStats {
    pub fn tally(orders: &[Order]) -> Self {
        let mut stats = BucketStats { total: orders.len(), ..Default::default() };
        for order in orders {
            match order.delivery_status {
                DeliveryStatus::Delivered => stats.delivered += 1,
                DeliveryStatus::Pending => stats.pending += 1,
                DeliveryStatus::Cancelled => stats.cancelled += 1,
                DeliveryStatus::InTransit => stats.in_transit += 1,
            }
        }
        stats
    }
}

//--------------------------------------   SettlementBucket   ---------------------------------------------------------
/// One payout period: the orders between two consecutive markers (or between the last marker and the end of the
/// history), with aggregated status counts and the earnings they represent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementBucket {
    pub marker_id: i64,
    pub label: String,
    pub anchor_order_id: i64,
    pub orders: Vec<Order>,
    pub stats: BucketStats,
    pub earnings: Pkr,
}

/// Partitions the order history into settlement buckets.
///
/// The orders are ranked newest first (row 0 is the most recent) by `created_at`, with `order_date` and then the
/// row id as tiebreaks so that the ranking is total and the output deterministic regardless of the input order.
/// Markers whose anchor no longer resolves to an order in the snapshot are dangling and silently skipped. The
/// surviving markers are walked from the newest anchor down; marker `i` covers the half-open row range from just
/// below its own anchor to just above the next marker's anchor. Two markers on adjacent rows produce a valid,
/// empty bucket.
///
/// `rate` is the configured payout per delivered order; `earnings = delivered * rate`.
pub fn compute_settlements(orders: &[Order], markers: &[SettlementMarker], rate: Pkr) -> Vec<SettlementBucket> {
    let mut rows: Vec<&Order> = orders.iter().collect();
    rows.sort_by(|a, b| {
        (b.created_at, b.order_date, b.id).cmp(&(a.created_at, a.order_date, a.id))
    });
    let row_index: HashMap<i64, usize> = rows.iter().enumerate().map(|(i, o)| (o.id, i)).collect();

    let mut anchored: Vec<(usize, &SettlementMarker)> =
        markers.iter().filter_map(|m| row_index.get(&m.after_order_id).map(|&i| (i, m))).collect();
    anchored.sort_by_key(|(row, marker)| (*row, marker.id));

    anchored
        .iter()
        .enumerate()
        .map(|(i, (row, marker))| {
            let start = row + 1;
            let end = anchored.get(i + 1).map(|(next_row, _)| *next_row).unwrap_or(rows.len()).max(start);
            let members: Vec<Order> = rows[start..end].iter().map(|o| (*o).clone()).collect();
            let stats = BucketStats::tally(&members);
            SettlementBucket {
                marker_id: marker.id,
                label: marker.label.clone(),
                anchor_order_id: marker.after_order_id,
                earnings: rate * stats.delivered as i64,
                stats,
                orders: members,
            }
        })
        .collect()
}
