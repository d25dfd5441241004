//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every functional handler is generic over the backend traits it needs, so the endpoint tests can run them
//! against any store implementation. Since actix cannot handle generics in handlers registered with the
//! `#[get(...)]`-style attributes, registration is implemented manually via the `route!` macro.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use order_tracking_engine::{
    ArchiveManagement,
    InvestmentManagement,
    MarkerManagement,
    OrderApi,
    OrderStore,
    SettlementApi,
};

use crate::{
    data_objects::{
        optional_owner,
        parse_owner,
        ArchiveSearchParams,
        BulkStatusParams,
        InvestmentParams,
        InvestmentQueryParams,
        JsonResponse,
        MarkerParams,
        MarkerQueryParams,
        NewOrderParams,
        OrderSearchParams,
        ReportParams,
        UpdateOrderParams,
    },
    errors::ServerError,
};

macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:tt)+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where B: $($bounds)+ + 'static
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(orders_search => Get "/orders" impl OrderStore);
pub async fn orders_search<B: OrderStore>(
    query: web::Query<OrderSearchParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Order search request: {:?}", query.0);
    let filter = query.to_filter()?;
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(new_order => Post "/orders" impl OrderStore);
pub async fn new_order<B: OrderStore>(
    body: web::Json<NewOrderParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ New order request from {} for serial {}", params.owner, params.serial_number);
    let order = api.process_new_order(params.into()).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(update_order => Put "/orders/{id}" impl OrderStore);
pub async fn update_order<B: OrderStore>(
    path: web::Path<i64>,
    body: web::Json<UpdateOrderParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ Update request for order {id}");
    let order = api.modify_order(id, body.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/orders/{id}" impl OrderStore);
pub async fn delete_order<B: OrderStore>(
    path: web::Path<i64>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ Delete request for order {id}");
    let archived = api.delete_order(id).await?;
    Ok(HttpResponse::Ok().json(archived))
}

route!(bulk_status => Post "/orders/bulk_status" impl OrderStore);
pub async fn bulk_status<B: OrderStore>(
    body: web::Json<BulkStatusParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ Bulk status update for {} to {}", params.owner, params.status);
    let summary = api.bulk_status_update(params.owner, &params.serials, params.status).await?;
    Ok(HttpResponse::Ok().json(summary))
}

//----------------------------------------------   Archive  ----------------------------------------------------
route!(deleted_orders => Get "/orders/deleted" impl ArchiveManagement);
pub async fn deleted_orders<B: ArchiveManagement>(
    query: web::Query<ArchiveSearchParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Archive search request: {:?}", query.0);
    let records = api.archived_orders(query.to_filter()?).await?;
    Ok(HttpResponse::Ok().json(records))
}

route!(purge_archive => Delete "/orders/deleted" impl ArchiveManagement);
pub async fn purge_archive<B: ArchiveManagement>(
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let purged = api.purge_archive().await?;
    info!("💻️ Purged {purged} archived orders");
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Purged {purged} archived orders"))))
}

//----------------------------------------------  Settlements ----------------------------------------------------
route!(markers => Get "/settlements" impl MarkerManagement);
pub async fn markers<B: MarkerManagement>(
    query: web::Query<MarkerQueryParams>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let owner = optional_owner(query.owner.as_deref())?;
    let markers = api.markers_for_owner(owner).await?;
    Ok(HttpResponse::Ok().json(markers))
}

route!(place_marker => Post "/settlements" impl MarkerManagement);
pub async fn place_marker<B: MarkerManagement>(
    body: web::Json<MarkerParams>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ Marker placement for {} after order {}", params.owner, params.after_order_id);
    let marker = api.place_marker(params.into()).await?;
    Ok(HttpResponse::Created().json(marker))
}

route!(remove_marker => Delete "/settlements/{id}" impl MarkerManagement);
pub async fn remove_marker<B: MarkerManagement>(
    path: web::Path<i64>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ Marker removal request for {id}");
    api.remove_marker(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Marker {id} removed"))))
}

route!(settlement_report => Get "/settlements/report" impl MarkerManagement + OrderStore);
pub async fn settlement_report<B: MarkerManagement + OrderStore>(
    query: web::Query<ReportParams>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let owner = parse_owner(&query.owner)?;
    trace!("💻️ Settlement report request for {owner}");
    let buckets = api.settlement_report(owner).await?;
    Ok(HttpResponse::Ok().json(buckets))
}

//----------------------------------------------  Investments ----------------------------------------------------
route!(investments => Get "/investments" impl InvestmentManagement);
pub async fn investments<B: InvestmentManagement>(
    query: web::Query<InvestmentQueryParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let records = api.investments(query.source.as_deref(), query.limit).await?;
    Ok(HttpResponse::Ok().json(records))
}

route!(new_investment => Post "/investments" impl InvestmentManagement);
pub async fn new_investment<B: InvestmentManagement>(
    body: web::Json<InvestmentParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    debug!("💻️ New investment of {} PKR", params.amount);
    let record = api.record_investment(params.into()).await?;
    Ok(HttpResponse::Created().json(record))
}
