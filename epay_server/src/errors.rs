use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use epay_billing::BillingError;
use epay_common::AmountError;
use epay_engine::{helpers::ChecksumError, EnvironmentStoreError, SqliteDatabaseError};
use thiserror::Error;

use crate::data_objects::{EpayResponse, EpayStatus};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(String),
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The billing back-end is unavailable. {0}")]
    BackendUnavailable(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
}

impl ServerError {
    /// The ePay status code that goes with this error.
    pub fn epay_status(&self) -> EpayStatus {
        match self {
            Self::AuthenticationError(_) => EpayStatus::InvalidChecksum,
            Self::NoRecordFound(_) => EpayStatus::InvalidSubscriber,
            Self::BackendUnavailable(_) => EpayStatus::TemporarilyUnavailable,
            _ => EpayStatus::GeneralError,
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::to_string(&EpayResponse::new(self.epay_status())).unwrap_or_default())
    }
}

impl From<BillingError> for ServerError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::Configuration(s) => Self::ConfigurationError(s),
            BillingError::NotFound(s) => Self::NoRecordFound(s),
            BillingError::Unavailable(s) => Self::BackendUnavailable(s),
        }
    }
}

impl From<EnvironmentStoreError> for ServerError {
    fn from(e: EnvironmentStoreError) -> Self {
        match e {
            // Without an environment there is no secret to check the request against
            EnvironmentStoreError::NotFound(_) => Self::AuthenticationError(e.to_string()),
            EnvironmentStoreError::NotConfigured(_) => Self::ConfigurationError(e.to_string()),
            EnvironmentStoreError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<ChecksumError> for ServerError {
    fn from(e: ChecksumError) -> Self {
        Self::AuthenticationError(e.to_string())
    }
}

impl From<AmountError> for ServerError {
    fn from(e: AmountError) -> Self {
        match e {
            AmountError::InvalidAmount(_) => Self::InvalidRequest(e.to_string()),
            AmountError::OutOfRange(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<SqliteDatabaseError> for ServerError {
    fn from(e: SqliteDatabaseError) -> Self {
        Self::InitializeError(e.to_string())
    }
}
