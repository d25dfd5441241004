use thiserror::Error;

use crate::db::common::StoreError;

#[derive(Debug, Error)]
pub enum OrderApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    BackendError(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum SettlementApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    BackendError(#[from] StoreError),
}
