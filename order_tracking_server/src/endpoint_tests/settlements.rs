use actix_web::{http::StatusCode, test::TestRequest};
use order_tracking_engine::db_types::{Investment, Order, SettlementMarker};
use serde_json::json;

use super::helpers::{send_request, test_db};

async fn create_order(db: &order_tracking_engine::SqliteDatabase, serial: &str, owner: &str) -> Order {
    let body = json!({"serial_number": serial, "owner": owner});
    let (status, body) = send_request(db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_str(&body).unwrap()
}

#[actix_web::test]
async fn marker_lifecycle_over_http() {
    let db = test_db().await;
    let anchor = create_order(&db, "MK-1", "Ahsan").await;

    let body = json!({"owner": "Ahsan", "after_order_id": anchor.id, "label": "March payout"});
    let (status, body) = send_request(&db, TestRequest::post().uri("/api/settlements").set_json(&body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let marker: SettlementMarker = serde_json::from_str(&body).unwrap();
    assert_eq!(marker.label, "March payout");
    assert_eq!(marker.after_order_id, anchor.id);

    let (status, body) = send_request(&db, TestRequest::get().uri("/api/settlements?owner=Ahsan")).await;
    assert_eq!(status, StatusCode::OK);
    let markers: Vec<SettlementMarker> = serde_json::from_str(&body).unwrap();
    assert_eq!(markers.len(), 1);

    let uri = format!("/api/settlements/{}", marker.id);
    let (status, _) = send_request(&db, TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_request(&db, TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn marker_with_missing_anchor_is_a_bad_request() {
    let db = test_db().await;
    let body = json!({"owner": "Ahsan", "after_order_id": 404});
    let (status, body) = send_request(&db, TestRequest::post().uri("/api/settlements").set_json(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("error"), "Error body was {body}");
}

#[actix_web::test]
async fn settlement_report_over_http() {
    let db = test_db().await;
    let older = create_order(&db, "RP-1", "Wahab").await;
    let _middle = create_order(&db, "RP-2", "Wahab").await;
    let newest = create_order(&db, "RP-3", "Wahab").await;
    // Backdate creation times so the ranking does not depend on insertion wall-clock time.
    sqlx::query("UPDATE orders SET created_at = datetime('now', printf('-%d hours', 10 - id))")
        .execute(db.pool())
        .await
        .unwrap();

    let body = json!({"owner": "Wahab", "after_order_id": newest.id});
    let (status, _) = send_request(&db, TestRequest::post().uri("/api/settlements").set_json(&body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_request(&db, TestRequest::get().uri("/api/settlements/report?owner=Wahab")).await;
    assert_eq!(status, StatusCode::OK);
    let buckets: serde_json::Value = serde_json::from_str(&body).unwrap();
    let bucket = &buckets[0];
    assert_eq!(bucket["anchor_order_id"], json!(newest.id));
    assert_eq!(bucket["stats"]["total"], json!(2));
    let ids: Vec<i64> = bucket["orders"].as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect();
    assert!(ids.contains(&older.id));

    // The report requires a concrete owner.
    let (status, _) = send_request(&db, TestRequest::get().uri("/api/settlements/report?owner=All")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn investment_endpoints() {
    let db = test_db().await;

    let body = json!({"amount": 50000, "note": "Stock replenishment"});
    let (status, body) = send_request(&db, TestRequest::post().uri("/api/investments").set_json(&body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let record: Investment = serde_json::from_str(&body).unwrap();
    assert_eq!(record.source, "Qatar");
    assert_eq!(record.note, "Stock replenishment");

    let (status, body) = send_request(&db, TestRequest::get().uri("/api/investments?source=Qatar")).await;
    assert_eq!(status, StatusCode::OK);
    let records: Vec<Investment> = serde_json::from_str(&body).unwrap();
    assert_eq!(records.len(), 1);

    let body = json!({"amount": -5});
    let (status, _) = send_request(&db, TestRequest::post().uri("/api/investments").set_json(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
