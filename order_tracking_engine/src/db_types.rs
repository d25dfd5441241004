use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

use ots_common::Pkr;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------        Owner        ---------------------------------------------------------
/// The closed set of reseller identities that orders can belong to.
///
/// Exactly one owner is exempt from the serial number uniqueness policy; consult
/// [`Owner::is_uniqueness_exempt`] rather than matching on the variant at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum Owner {
    #[sqlx(rename = "Emirate Essentials")]
    #[serde(rename = "Emirate Essentials")]
    EmirateEssentials,
    Ahsan,
    #[sqlx(rename = "Habibi Tools")]
    #[serde(rename = "Habibi Tools")]
    HabibiTools,
    Wahab,
}

impl Owner {
    pub const ALL: [Owner; 4] = [Owner::EmirateEssentials, Owner::Ahsan, Owner::HabibiTools, Owner::Wahab];

    /// The single policy point for the conditional uniqueness rule. Exempt owners may reuse any serial number,
    /// including ones already used by non-exempt owners. All non-exempt owners share one uniqueness domain.
    pub fn is_uniqueness_exempt(&self) -> bool {
        matches!(self, Owner::Wahab)
    }

    /// The value stored in the `normalized_serial` column for an order with this owner. Exempt owners leave the
    /// column unset so that the partial unique index skips their rows.
    pub fn normalized_serial(&self, serial: &str) -> Option<String> {
        if self.is_uniqueness_exempt() {
            None
        } else {
            Some(serial.trim().to_string())
        }
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::EmirateEssentials => write!(f, "Emirate Essentials"),
            Owner::Ahsan => write!(f, "Ahsan"),
            Owner::HabibiTools => write!(f, "Habibi Tools"),
            Owner::Wahab => write!(f, "Wahab"),
        }
    }
}

impl FromStr for Owner {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Emirate Essentials" => Ok(Self::EmirateEssentials),
            "Ahsan" => Ok(Self::Ahsan),
            "Habibi Tools" => Ok(Self::HabibiTools),
            "Wahab" => Ok(Self::Wahab),
            s => Err(ConversionError(format!("Invalid owner: {s}"))),
        }
    }
}

//--------------------------------------    DeliveryStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// The order has been created and has not been handed to a courier yet.
    #[default]
    Pending,
    /// The order is with the courier.
    #[sqlx(rename = "In Transit")]
    #[serde(rename = "In Transit")]
    InTransit,
    /// The order reached the customer. Delivered orders earn the per-order settlement rate.
    Delivered,
    /// The order was cancelled by the customer or admin.
    Cancelled,
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "Pending"),
            DeliveryStatus::InTransit => write!(f, "In Transit"),
            DeliveryStatus::Delivered => write!(f, "Delivered"),
            DeliveryStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = ConversionError;

    /// Status labels arriving over the wire are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid delivery status: {s}"))),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub serial_number: String,
    pub owner: Owner,
    pub order_date: DateTime<Utc>,
    pub delivery_status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub serial_number: String,
    pub owner: Owner,
    /// The time the order was placed. If not supplied, the store uses the insertion time.
    pub order_date: Option<DateTime<Utc>>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(serial_number: S, owner: Owner) -> Self {
        Self { serial_number: serial_number.into(), owner, order_date: None }
    }

    pub fn with_order_date(mut self, order_date: DateTime<Utc>) -> Self {
        self.order_date = Some(order_date);
        self
    }

    pub fn normalized_serial(&self) -> Option<String> {
        self.owner.normalized_serial(&self.serial_number)
    }
}

//--------------------------------------      OrderUpdate     ---------------------------------------------------------
/// A partial update against a live order. Only the fields that are permitted to change are exposed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub new_serial_number: Option<String>,
    pub new_status: Option<DeliveryStatus>,
    pub new_order_date: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    pub fn with_serial_number<S: Into<String>>(mut self, serial: S) -> Self {
        self.new_serial_number = Some(serial.into());
        self
    }

    pub fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.new_status = Some(status);
        self
    }

    pub fn with_order_date(mut self, order_date: DateTime<Utc>) -> Self {
        self.new_order_date = Some(order_date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.new_serial_number.is_none() && self.new_status.is_none() && self.new_order_date.is_none()
    }
}

//--------------------------------------     DeletedOrder     ---------------------------------------------------------
/// An append-only archive record of a deleted order. The snapshot is the full order state at deletion time and is
/// never mutated after insert.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeletedOrder {
    pub id: i64,
    pub original_id: i64,
    pub serial_number: String,
    pub owner: Owner,
    pub order_date: DateTime<Utc>,
    pub delivery_status: DeliveryStatus,
    pub deleted_at: DateTime<Utc>,
    pub snapshot: Json<Order>,
}

//--------------------------------------   SettlementMarker   ---------------------------------------------------------
/// A user-placed settlement boundary. The marker sits immediately after `after_order_id` in chronological order.
///
/// The reference is non-owning: the anchor order may be deleted later, leaving the marker dangling. Dangling markers
/// are an expected steady-state condition and are filtered out during settlement computation, never an error.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SettlementMarker {
    pub id: i64,
    pub owner: Owner,
    pub after_order_id: i64,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_MARKER_LABEL: &str = "Settlement";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSettlementMarker {
    pub owner: Owner,
    pub after_order_id: i64,
    pub label: Option<String>,
}

impl NewSettlementMarker {
    pub fn new(owner: Owner, after_order_id: i64) -> Self {
        Self { owner, after_order_id, label: None }
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }
}

//--------------------------------------      Investment      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    pub amount: Pkr,
    pub currency: String,
    pub note: String,
    pub source: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_INVESTMENT_SOURCE: &str = "Qatar";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvestment {
    pub amount: Pkr,
    pub currency: Option<String>,
    pub note: Option<String>,
    pub source: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl NewInvestment {
    pub fn new(amount: Pkr) -> Self {
        Self { amount, currency: None, note: None, source: None, date: None }
    }

    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}
