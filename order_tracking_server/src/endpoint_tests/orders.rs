use actix_web::{http::StatusCode, test::TestRequest};
use order_tracking_engine::db_types::{DeletedOrder, DeliveryStatus, Order, Owner};
use serde_json::json;

use super::helpers::{send_request, test_db};

#[actix_web::test]
async fn create_and_search_orders() {
    let db = test_db().await;

    let body = json!({"serial_number": "EP-100", "owner": "Ahsan"});
    let (status, body) = send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let order: Order = serde_json::from_str(&body).expect("Valid order in response");
    assert_eq!(order.serial_number, "EP-100");
    assert_eq!(order.owner, Owner::Ahsan);
    assert_eq!(order.delivery_status, DeliveryStatus::Pending);

    let (status, body) = send_request(&db, TestRequest::get().uri("/api/orders?owner=Ahsan")).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);

    // The All wildcard and no owner filter are equivalent.
    let (status, body) = send_request(&db, TestRequest::get().uri("/api/orders?owner=All")).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
}

#[actix_web::test]
async fn duplicate_serial_is_a_bad_request() {
    let db = test_db().await;

    let body = json!({"serial_number": "DUP-1", "owner": "Emirate Essentials"});
    let (status, _) = send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let body = json!({"serial_number": "DUP-1", "owner": "Habibi Tools"});
    let (status, body) = send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("error"), "Error body was {body}");

    // The exempt owner is allowed the same serial.
    let body = json!({"serial_number": "DUP-1", "owner": "Wahab"});
    let (status, _) = send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn unknown_owner_is_a_bad_request() {
    let db = test_db().await;
    let (status, _) = send_request(&db, TestRequest::get().uri("/api/orders?owner=Nobody")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn update_then_delete_an_order() {
    let db = test_db().await;

    let body = json!({"serial_number": "UPD-1", "owner": "Ahsan"});
    let (_, body) = send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    let order: Order = serde_json::from_str(&body).unwrap();

    let update = json!({"status": "Delivered"});
    let uri = format!("/api/orders/{}", order.id);
    let (status, body) = send_request(&db, TestRequest::put().uri(&uri).set_json(&update)).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(updated.delivery_status, DeliveryStatus::Delivered);

    let (status, body) = send_request(&db, TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let archived: DeletedOrder = serde_json::from_str(&body).unwrap();
    assert_eq!(archived.original_id, order.id);
    assert_eq!(archived.delivery_status, DeliveryStatus::Delivered);

    let (status, _) = send_request(&db, TestRequest::delete().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn empty_update_is_a_bad_request() {
    let db = test_db().await;

    let body = json!({"serial_number": "UPD-2", "owner": "Wahab"});
    let (_, body) = send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    let uri = format!("/api/orders/{}", order.id);
    let (status, _) = send_request(&db, TestRequest::put().uri(&uri).set_json(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn bulk_status_accepts_a_delimited_string() {
    let db = test_db().await;

    for serial in ["B-1", "B-2"] {
        let body = json!({"serial_number": serial, "owner": "Wahab"});
        send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    }
    let body = json!({"owner": "Wahab", "serials": "B-1, B-2, B-9", "status": "Delivered"});
    let (status, body) = send_request(&db, TestRequest::post().uri("/api/orders/bulk_status").set_json(&body)).await;
    assert_eq!(status, StatusCode::OK);
    let summary: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(summary["matched"], json!(["B-1", "B-2"]));
    assert_eq!(summary["not_found"], json!(["B-9"]));
    assert_eq!(summary["modified"], json!(2));
}

#[actix_web::test]
async fn archive_listing_and_purge() {
    let db = test_db().await;

    let body = json!({"serial_number": "ARC-1", "owner": "Ahsan"});
    let (_, body) = send_request(&db, TestRequest::post().uri("/api/orders").set_json(&body)).await;
    let order: Order = serde_json::from_str(&body).unwrap();
    send_request(&db, TestRequest::delete().uri(&format!("/api/orders/{}", order.id))).await;

    let (status, body) = send_request(&db, TestRequest::get().uri("/api/orders/deleted?owner=Ahsan")).await;
    assert_eq!(status, StatusCode::OK);
    let records: Vec<DeletedOrder> = serde_json::from_str(&body).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].serial_number, "ARC-1");

    let (status, body) = send_request(&db, TestRequest::delete().uri("/api/orders/deleted")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Purged 1 archived orders"), "Body was {body}");

    let (_, body) = send_request(&db, TestRequest::get().uri("/api/orders/deleted")).await;
    let records: Vec<DeletedOrder> = serde_json::from_str(&body).unwrap();
    assert!(records.is_empty());
}
