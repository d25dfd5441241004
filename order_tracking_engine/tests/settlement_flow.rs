use chrono::{DateTime, Utc};
use order_tracking_engine::{
    db_types::{DeliveryStatus, NewOrder, NewSettlementMarker, Order, OrderUpdate, Owner, DEFAULT_MARKER_LABEL},
    OrderApi,
    SettlementApi,
    SettlementApiError,
    SqliteDatabase,
    StoreError,
};
use ots_common::Pkr;

mod support;

const RATE: Pkr = Pkr::new(500);

fn apis(db: SqliteDatabase) -> (OrderApi<SqliteDatabase>, SettlementApi<SqliteDatabase>) {
    (OrderApi::new(db.clone()), SettlementApi::new(db, RATE))
}

fn day(d: u32) -> DateTime<Utc> {
    format!("2025-04-{d:02}T08:00:00Z").parse().unwrap()
}

/// Seeds `n` orders for `owner`, oldest first, and backdates `created_at` to the order date so that the
/// chronological ranking does not depend on insertion wall-clock time. Returns the orders oldest first.
async fn seed_history(db: &SqliteDatabase, api: &OrderApi<SqliteDatabase>, owner: Owner, n: u32) -> Vec<Order> {
    let mut seeded = vec![];
    for i in 1..=n {
        let order = api
            .process_new_order(NewOrder::new(format!("{owner}-{i}"), owner).with_order_date(day(i)))
            .await
            .unwrap();
        seeded.push(order);
    }
    sqlx::query("UPDATE orders SET created_at = order_date, updated_at = order_date")
        .execute(db.pool())
        .await
        .unwrap();
    for order in &mut seeded {
        *order = api.order_by_id(order.id).await.unwrap().unwrap();
    }
    seeded
}

#[tokio::test]
async fn marker_requires_a_live_anchor_of_the_same_owner() {
    let db = support::prepare_test_env(&support::random_db_path()).await;
    let (orders, settlements) = apis(db);

    let err = settlements.place_marker(NewSettlementMarker::new(Owner::Ahsan, 404)).await.unwrap_err();
    assert!(matches!(err, SettlementApiError::BackendError(StoreError::AnchorOrderNotFound(404))));

    let anchor = orders.process_new_order(NewOrder::new("M-1", Owner::Wahab)).await.unwrap();
    let err = settlements.place_marker(NewSettlementMarker::new(Owner::Ahsan, anchor.id)).await.unwrap_err();
    assert!(matches!(
        err,
        SettlementApiError::BackendError(StoreError::AnchorOwnerMismatch {
            marker_owner: Owner::Ahsan,
            order_owner: Owner::Wahab,
        })
    ));
}

#[tokio::test]
async fn marker_lifecycle() {
    let db = support::prepare_test_env(&support::random_db_path()).await;
    let (orders, settlements) = apis(db);

    let anchor = orders.process_new_order(NewOrder::new("M-2", Owner::Ahsan)).await.unwrap();
    let plain = settlements.place_marker(NewSettlementMarker::new(Owner::Ahsan, anchor.id)).await.unwrap();
    assert_eq!(plain.label, DEFAULT_MARKER_LABEL);
    let labelled = settlements
        .place_marker(NewSettlementMarker::new(Owner::Ahsan, anchor.id).with_label("April payout"))
        .await
        .unwrap();
    assert_eq!(labelled.label, "April payout");

    let listed = settlements.markers_for_owner(Some(Owner::Ahsan)).await.unwrap();
    assert_eq!(listed.iter().map(|m| m.id).collect::<Vec<_>>(), vec![plain.id, labelled.id], "oldest first");
    assert!(settlements.markers_for_owner(Some(Owner::Wahab)).await.unwrap().is_empty());

    settlements.remove_marker(plain.id).await.unwrap();
    let err = settlements.remove_marker(plain.id).await.unwrap_err();
    assert!(matches!(err, SettlementApiError::BackendError(StoreError::MarkerNotFound(_))));
    assert_eq!(settlements.markers_for_owner(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn report_partitions_the_order_history() {
    let db = support::prepare_test_env(&support::random_db_path()).await;
    let (orders, settlements) = apis(db.clone());

    // Oldest first: h[0]..h[3]. Newest-first ranking puts h[3] on row 0.
    let history = seed_history(&db, &orders, Owner::Ahsan, 4).await;
    let newer = settlements
        .place_marker(NewSettlementMarker::new(Owner::Ahsan, history[2].id))
        .await
        .unwrap();
    let older = settlements
        .place_marker(NewSettlementMarker::new(Owner::Ahsan, history[0].id))
        .await
        .unwrap();

    let buckets = settlements.settlement_report(Owner::Ahsan).await.unwrap();
    assert_eq!(buckets.len(), 2);
    // The newer marker's bucket covers everything strictly older than its anchor, down to the older anchor.
    assert_eq!(buckets[0].marker_id, newer.id);
    assert_eq!(buckets[0].orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![history[1].id]);
    // The oldest marker's bucket runs to the end of the history, which holds nothing below h[0].
    assert_eq!(buckets[1].marker_id, older.id);
    assert!(buckets[1].orders.is_empty());
}

#[tokio::test]
async fn report_earnings_use_the_configured_rate() {
    let db = support::prepare_test_env(&support::random_db_path()).await;
    let (orders, settlements) = apis(db.clone());

    let history = seed_history(&db, &orders, Owner::HabibiTools, 4).await;
    for order in &history[0..2] {
        orders.modify_order(order.id, OrderUpdate::default().with_status(DeliveryStatus::Delivered)).await.unwrap();
    }
    settlements.place_marker(NewSettlementMarker::new(Owner::HabibiTools, history[3].id)).await.unwrap();

    let buckets = settlements.settlement_report(Owner::HabibiTools).await.unwrap();
    assert_eq!(buckets.len(), 1);
    let bucket = &buckets[0];
    assert_eq!(bucket.stats.total, 3);
    assert_eq!(bucket.stats.delivered, 2);
    assert_eq!(bucket.stats.pending, 1);
    assert_eq!(bucket.earnings, Pkr::new(1000));
}

#[tokio::test]
async fn dangling_marker_is_tolerated_after_anchor_deletion() {
    let db = support::prepare_test_env(&support::random_db_path()).await;
    let (orders, settlements) = apis(db.clone());

    let history = seed_history(&db, &orders, Owner::Wahab, 3).await;
    let dangling = settlements.place_marker(NewSettlementMarker::new(Owner::Wahab, history[1].id)).await.unwrap();
    let kept = settlements.place_marker(NewSettlementMarker::new(Owner::Wahab, history[2].id)).await.unwrap();

    orders.delete_order(history[1].id).await.unwrap();
    // The marker still exists but its anchor is gone; reports skip it without failing.
    assert_eq!(settlements.markers_for_owner(Some(Owner::Wahab)).await.unwrap().len(), 2);
    let buckets = settlements.settlement_report(Owner::Wahab).await.unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].marker_id, kept.id);
    assert_ne!(buckets[0].marker_id, dangling.id);
    assert_eq!(buckets[0].orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![history[0].id]);
}

#[tokio::test]
async fn report_is_scoped_to_the_requested_owner() {
    let db = support::prepare_test_env(&support::random_db_path()).await;
    let (orders, settlements) = apis(db.clone());

    let ahsan = seed_history(&db, &orders, Owner::Ahsan, 2).await;
    let wahab = seed_history(&db, &orders, Owner::Wahab, 2).await;
    settlements.place_marker(NewSettlementMarker::new(Owner::Ahsan, ahsan[1].id)).await.unwrap();
    settlements.place_marker(NewSettlementMarker::new(Owner::Wahab, wahab[1].id)).await.unwrap();

    let buckets = settlements.settlement_report(Owner::Ahsan).await.unwrap();
    assert_eq!(buckets.len(), 1);
    assert!(buckets[0].orders.iter().all(|o| o.owner == Owner::Ahsan));
    assert_eq!(buckets[0].orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![ahsan[0].id]);
}
