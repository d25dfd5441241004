use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{DeliveryStatus, Owner};

//--------------------------------------   OrderQueryFilter   ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub owner: Option<Owner>,
    /// Case-insensitive substring match on the serial number.
    pub serial_search: Option<String>,
    pub status: Option<Vec<DeliveryStatus>>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_serial_search<S: Into<String>>(mut self, search: S) -> Self {
        self.serial_search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none() &&
            self.serial_search.is_none() &&
            self.status.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(owner) = &self.owner {
            write!(f, "owner: {owner}. ")?;
        }
        if let Some(search) = &self.serial_search {
            write!(f, "serial contains: {search}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        Ok(())
    }
}

//--------------------------------------      Pagination      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 1000;
    pub const MAX_LIMIT: u32 = 5000;

    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: Some(page), limit: Some(limit) }
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    /// Widened to u64 so that an adversarial page/limit pair cannot overflow the multiplication.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.unwrap_or(1).max(1) - 1) * u64::from(self.effective_limit())
    }
}

//--------------------------------------  ArchiveQueryFilter  ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveQueryFilter {
    pub owner: Option<Owner>,
    pub serial_search: Option<String>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl ArchiveQueryFilter {
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_serial_search<S: Into<String>>(mut self, search: S) -> Self {
        self.serial_search = Some(search.into());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none() && self.serial_search.is_none()
    }
}

//--------------------------------------      SerialList      ---------------------------------------------------------
/// The serial numbers of a bulk status update, accepted either as a proper list or as a single delimited string
/// (commas, semicolons, or any whitespace including newlines).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerialList {
    Delimited(String),
    List(Vec<String>),
}

impl SerialList {
    /// Splits, trims and deduplicates the input, preserving first-seen order.
    pub fn normalized(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            SerialList::Delimited(s) => s.split([',', ';', '\n', '\r', '\t', ' ']).collect(),
            SerialList::List(items) => items.iter().map(String::as_str).collect(),
        };
        let mut seen = Vec::new();
        for serial in raw {
            let serial = serial.trim();
            if serial.is_empty() || seen.iter().any(|s| s == serial) {
                continue;
            }
            seen.push(serial.to_string());
        }
        seen
    }
}

impl From<&str> for SerialList {
    fn from(s: &str) -> Self {
        SerialList::Delimited(s.to_string())
    }
}

impl From<Vec<String>> for SerialList {
    fn from(items: Vec<String>) -> Self {
        SerialList::List(items)
    }
}
