use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use order_tracking_engine::{
    db_types::{DeliveryStatus, NewInvestment, NewOrder, NewSettlementMarker, OrderUpdate, Owner},
    order_objects::{ArchiveQueryFilter, OrderQueryFilter, Pagination, SerialList},
};
use ots_common::Pkr;
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// The wildcard owner value accepted by query parameters. It stands for "no owner filter".
pub const ALL_OWNERS: &str = "All";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

pub fn parse_owner(s: &str) -> Result<Owner, ServerError> {
    Owner::from_str(s).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))
}

/// Resolves an optional owner query parameter. Absent, blank, or the `All` wildcard all mean "every owner".
pub fn optional_owner(owner: Option<&str>) -> Result<Option<Owner>, ServerError> {
    match owner.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s == ALL_OWNERS => Ok(None),
        Some(s) => parse_owner(s).map(Some),
    }
}

//--------------------------------------   Order requests     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderParams {
    pub serial_number: String,
    pub owner: Owner,
    pub order_date: Option<DateTime<Utc>>,
}

impl From<NewOrderParams> for NewOrder {
    fn from(params: NewOrderParams) -> Self {
        let order = NewOrder::new(params.serial_number, params.owner);
        match params.order_date {
            Some(date) => order.with_order_date(date),
            None => order,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderParams {
    pub serial_number: Option<String>,
    pub status: Option<DeliveryStatus>,
    pub order_date: Option<DateTime<Utc>>,
}

impl From<UpdateOrderParams> for OrderUpdate {
    fn from(params: UpdateOrderParams) -> Self {
        OrderUpdate {
            new_serial_number: params.serial_number,
            new_status: params.status,
            new_order_date: params.order_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkStatusParams {
    pub owner: Owner,
    pub serials: SerialList,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearchParams {
    pub owner: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderSearchParams {
    pub fn to_filter(&self) -> Result<OrderQueryFilter, ServerError> {
        let mut filter = OrderQueryFilter::default();
        if let Some(owner) = optional_owner(self.owner.as_deref())? {
            filter = filter.with_owner(owner);
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.with_serial_search(search);
        }
        if let Some(status) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let status = DeliveryStatus::from_str(status)
                .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
            filter = filter.with_status(status);
        }
        if let Some(since) = self.since {
            filter = filter.since(since);
        }
        if let Some(until) = self.until {
            filter = filter.until(until);
        }
        Ok(filter)
    }
}

//--------------------------------------  Archive requests    ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveSearchParams {
    pub owner: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ArchiveSearchParams {
    pub fn to_filter(&self) -> Result<ArchiveQueryFilter, ServerError> {
        let mut filter = ArchiveQueryFilter::default()
            .with_pagination(Pagination { page: self.page, limit: self.limit });
        if let Some(owner) = optional_owner(self.owner.as_deref())? {
            filter = filter.with_owner(owner);
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.with_serial_search(search);
        }
        Ok(filter)
    }
}

//--------------------------------------  Settlement requests ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerParams {
    pub owner: Owner,
    pub after_order_id: i64,
    pub label: Option<String>,
}

impl From<MarkerParams> for NewSettlementMarker {
    fn from(params: MarkerParams) -> Self {
        let marker = NewSettlementMarker::new(params.owner, params.after_order_id);
        match params.label {
            Some(label) => marker.with_label(label),
            None => marker,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerQueryParams {
    pub owner: Option<String>,
}

/// The settlement report is always computed for one specific owner; the `All` wildcard is not valid here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportParams {
    pub owner: String,
}

//-------------------------------------- Investment requests  ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentParams {
    pub amount: i64,
    pub currency: Option<String>,
    pub note: Option<String>,
    pub source: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl From<InvestmentParams> for NewInvestment {
    fn from(params: InvestmentParams) -> Self {
        NewInvestment {
            amount: Pkr::new(params.amount),
            currency: params.currency,
            note: params.note,
            source: params.source,
            date: params.date,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestmentQueryParams {
    pub source: Option<String>,
    pub limit: Option<u32>,
}
