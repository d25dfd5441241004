use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use order_tracking_engine::{OrderApi, SettlementApi, SqliteDatabase, MIGRATOR};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
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
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.auto_migrate {
        MIGRATOR.run(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
        info!("🚀️ Migrations complete");
    }
    // Converge the on-disk constraints to the effective uniqueness policy before accepting writes.
    let dropped =
        db.repair_legacy_serial_indexes().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if dropped > 0 {
        info!("🚀️ Dropped {dropped} legacy serial number index(es)");
    }
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let rate = config.settlement_rate;
    let srv = HttpServer::new(move || {
        let orders_api = OrderApi::new(db.clone());
        let settlements_api = SettlementApi::new(db.clone(), rate);
        // Fixed paths must be registered before the `{id}` resources that would otherwise shadow them.
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
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ots::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(settlements_api))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
