use epay_engine::PaymentOrderStoreError;
use thiserror::Error;

/// The failures a caller of a billing back-end has to tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// The environment does not describe a usable back-end. Nothing the caller sends will fix this.
    #[error("Invalid billing configuration: {0}")]
    Configuration(String),
    /// Unknown subscriber or unknown transaction.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Network errors and unexpected responses from the remote API, or a failing payment-order store.
    #[error("Billing back-end unavailable: {0}")]
    Unavailable(String),
}

impl From<PaymentOrderStoreError> for BillingError {
    fn from(e: PaymentOrderStoreError) -> Self {
        match e {
            PaymentOrderStoreError::NotFound(tid) => Self::NotFound(format!("Payment order {tid}")),
            PaymentOrderStoreError::DatabaseError(e) => Self::Unavailable(format!("Payment order store: {e}")),
        }
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(e: reqwest::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}
