use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use order_tracking_engine::{
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    OrderApi,
    SettlementApi,
    SqliteDatabase,
};
use ots_common::Pkr;

use crate::routes::{
    health,
    BulkStatusRoute,
    DeleteOrderRoute,
    DeletedOrdersRoute,
    InvestmentsRoute,
    MarkersRoute,
    NewInvestmentRoute,
    NewOrderRoute,
    OrdersSearchRoute,
    PlaceMarkerRoute,
    PurgeArchiveRoute,
    RemoveMarkerRoute,
    SettlementReportRoute,
    UpdateOrderRoute,
};

pub const TEST_RATE: Pkr = Pkr::new(500);

/// Creates a fresh, migrated database for one test.
pub async fn test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    // Single connection: pooled sqlite connections see stale data on this filesystem.
    SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database")
}

/// Runs one request against an app wired up exactly like the production server. State lives in the database, so
/// consecutive calls against the same `db` see each other's writes.
pub async fn send_request(db: &SqliteDatabase, req: TestRequest) -> (StatusCode, String) {
    let orders_api = OrderApi::new(db.clone());
    let settlements_api = SettlementApi::new(db.clone(), TEST_RATE);
    let api_scope = web::scope("/api")
        .service(BulkStatusRoute::<SqliteDatabase>::new())
        .service(DeletedOrdersRoute::<SqliteDatabase>::new())
        .service(PurgeArchiveRoute::<SqliteDatabase>::new())
        .service(OrdersSearchRoute::<SqliteDatabase>::new())
        .service(NewOrderRoute::<SqliteDatabase>::new())
        .service(UpdateOrderRoute::<SqliteDatabase>::new())
        .service(DeleteOrderRoute::<SqliteDatabase>::new())
        .service(SettlementReportRoute::<SqliteDatabase>::new())
        .service(MarkersRoute::<SqliteDatabase>::new())
        .service(PlaceMarkerRoute::<SqliteDatabase>::new())
        .service(RemoveMarkerRoute::<SqliteDatabase>::new())
        .service(InvestmentsRoute::<SqliteDatabase>::new())
        .service(NewInvestmentRoute::<SqliteDatabase>::new());
    let app = App::new()
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(settlements_api))
        .service(health)
        .service(api_scope);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
