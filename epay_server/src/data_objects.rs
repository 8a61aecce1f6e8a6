use std::collections::HashMap;

use epay_engine::{
    db_types::{Environment, RequestParams},
    helpers::{first_param, CHECKSUM_PARAM},
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

pub const TYPE_PARAM: &str = "TYPE";
pub const IDN_PARAM: &str = "IDN";
pub const AMOUNT_PARAM: &str = "AMOUNT";
pub const TID_PARAM: &str = "TID";
pub const INVOICES_PARAM: &str = "INVOICES";

/// The `TYPE` of an ePay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Check,
    Billing,
}

impl RequestType {
    pub fn parse(value: Option<&str>) -> Result<Self, ServerError> {
        match value {
            Some("CHECK") => Ok(Self::Check),
            Some("BILLING") => Ok(Self::Billing),
            Some(other) => Err(ServerError::InvalidRequest(format!("Unsupported TYPE '{other}'"))),
            None => Err(ServerError::InvalidRequest("The request has no TYPE".to_string())),
        }
    }
}

/// Status codes of the ePay billing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpayStatus {
    Success,
    InvalidSubscriber,
    NoBillDue,
    TemporarilyUnavailable,
    InvalidChecksum,
    GeneralError,
}

impl EpayStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Success => "00",
            Self::InvalidSubscriber => "14",
            Self::NoBillDue => "62",
            Self::TemporarilyUnavailable => "80",
            Self::InvalidChecksum => "93",
            Self::GeneralError => "96",
        }
    }
}

/// The JSON body of every answer to ePay. Absent fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct EpayResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortdesc: Option<String>,
    /// In minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
}

impl EpayResponse {
    pub fn new(status: EpayStatus) -> Self {
        Self { status: status.code().to_string(), ..Default::default() }
    }

    pub fn success() -> Self {
        Self::new(EpayStatus::Success)
    }

    pub fn with_idn<S: Into<String>>(mut self, idn: S) -> Self {
        self.idn = Some(idn.into());
        self
    }

    pub fn with_bill<S: Into<String>>(mut self, subscriber_name: S, amount: i64) -> Self {
        self.shortdesc = Some(subscriber_name.into());
        self.amount = Some(amount);
        self
    }

    pub fn with_tid<S: Into<String>>(mut self, tid: S) -> Self {
        self.tid = Some(tid.into());
        self
    }
}

/// An ePay request whose checksum has been verified, together with the environment it was verified against. The
/// checksum middleware attaches this to the request for the handlers.
#[derive(Debug, Clone)]
pub struct VerifiedRequest {
    pub environment: Environment,
    pub params: RequestParams,
}

impl VerifiedRequest {
    pub fn new(environment: Environment, params: RequestParams) -> Self {
        Self { environment, params }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        first_param(&self.params, key)
    }

    /// The first value of `key`, which must be present and non-empty.
    pub fn required_param(&self, key: &str) -> Result<&str, ServerError> {
        self.param(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ServerError::InvalidRequest(format!("Missing {key} parameter")))
    }

    pub fn request_type(&self) -> Result<RequestType, ServerError> {
        RequestType::parse(self.param(TYPE_PARAM))
    }

    /// Every parameter except the checksum, first values only.
    pub fn metadata(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .filter(|(k, _)| k.as_str() != CHECKSUM_PARAM)
            .map(|(k, v)| (k.clone(), v.first().cloned().unwrap_or_default()))
            .collect()
    }
}
