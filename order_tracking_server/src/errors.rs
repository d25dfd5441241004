use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use order_tracking_engine::{OrderApiError, SettlementApiError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// Maps store failures onto the HTTP taxonomy. Rejections the client can fix are 400s, missing records are 404s,
/// and persistence failures (including a constraint race that survived index repair) are 500s.
fn from_store_error(e: StoreError) -> ServerError {
    match e {
        StoreError::DuplicateSerial(_) |
        StoreError::AnchorOrderNotFound(_) |
        StoreError::AnchorOwnerMismatch { .. } => ServerError::InvalidRequestBody(e.to_string()),
        StoreError::OrderNotFound(_) | StoreError::MarkerNotFound(_) => ServerError::NoRecordFound(e.to_string()),
        StoreError::DriverError(_) | StoreError::ConstraintRace(_) => ServerError::BackendError(e.to_string()),
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::ValidationError(msg) => Self::InvalidRequestBody(msg),
            OrderApiError::BackendError(e) => from_store_error(e),
        }
    }
}

impl From<SettlementApiError> for ServerError {
    fn from(e: SettlementApiError) -> Self {
        match e {
            SettlementApiError::ValidationError(msg) => Self::InvalidRequestBody(msg),
            SettlementApiError::BackendError(e) => from_store_error(e),
        }
    }
}
