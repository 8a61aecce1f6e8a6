use std::collections::HashMap;

use chrono::{DateTime, Utc};
use epay_common::Secret;
use serde::{Deserialize, Serialize};

/// The parameters of an inbound ePay request. A key may carry several values; only the first one is significant.
pub type RequestParams = HashMap<String, Vec<String>>;

//--------------------------------------   PaymentOrderRecord   --------------------------------------------------------
/// One payment order, from creation through confirmation.
///
/// Records are keyed by `transaction_id`. They are created when the order-creation webhook arrives and overwritten in
/// full when the order is confirmed. This system never deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrderRecord {
    pub transaction_id: String,
    pub subscriber_id: String,
    pub customer_name: String,
    pub client_id: String,
    /// Decimal amount, kept as text so that it is never subjected to floating-point arithmetic.
    pub amount: String,
    pub created_at: DateTime<Utc>,
    /// `None` until the order has been confirmed.
    pub processed_on: Option<DateTime<Utc>>,
    pub invoice_ids: Vec<String>,
}

impl PaymentOrderRecord {
    pub fn new<S: Into<String>>(transaction_id: S, subscriber_id: S, amount: S) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            subscriber_id: subscriber_id.into(),
            customer_name: String::default(),
            client_id: String::default(),
            amount: amount.into(),
            created_at: Utc::now(),
            processed_on: None,
            invoice_ids: Vec::new(),
        }
    }

    pub fn with_customer<S: Into<String>>(mut self, client_id: S, customer_name: S) -> Self {
        self.client_id = client_id.into();
        self.customer_name = customer_name.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_processed(&self) -> bool {
        self.processed_on.is_some()
    }

    /// Marks the order as processed and appends `invoice_ids` to the ones already associated with it.
    pub fn mark_processed(&mut self, processed_on: DateTime<Utc>, invoice_ids: &[String]) {
        self.processed_on = Some(processed_on);
        self.invoice_ids.extend_from_slice(invoice_ids);
    }
}

//--------------------------------------      Environment       --------------------------------------------------------
pub const META_BILLING_URL: &str = "billingUrl";
pub const META_API_KEY: &str = "apiKey";
pub const META_METHOD_ID: &str = "methodId";
pub const META_PROVIDER_NAME: &str = "providerName";
pub const META_PROVIDER_PAYMENT_ID: &str = "providerPaymentId";
pub const META_PROVIDER_PAYMENT_TIME: &str = "providerPaymentTime";
pub const META_ORGANIZATION_ID: &str = "organizationId";

/// All the metadata keys that configure the UCRM billing back-end.
pub const UCRM_METADATA_KEYS: [&str; 7] = [
    META_BILLING_URL,
    META_API_KEY,
    META_METHOD_ID,
    META_PROVIDER_NAME,
    META_PROVIDER_PAYMENT_ID,
    META_PROVIDER_PAYMENT_TIME,
    META_ORGANIZATION_ID,
];

/// The billing configuration of one tenant.
///
/// The TelcoNG fields sit at the top level. UCRM configuration travels in `metadata`, keyed by the `META_*`
/// constants in this module.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub name: String,
    /// Service-account key (JSON) used to obtain OAuth2 tokens for the TelcoNG API.
    pub billing_jwt_key: Secret<String>,
    pub billing_key: Secret<String>,
    pub billing_url: String,
    /// The secret shared with ePay, used to verify request checksums.
    pub epay_secret: Secret<String>,
    pub merchant_id: String,
    pub metadata: HashMap<String, String>,
}

impl Environment {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// True if the TelcoNG back-end has both key material and a billing URL.
    pub fn has_telcong_config(&self) -> bool {
        !self.billing_jwt_key.is_empty() && !self.billing_url.is_empty()
    }

    /// True if UCRM metadata names a billing URL. The value itself is not inspected.
    pub fn has_ucrm_config(&self) -> bool {
        self.metadata.contains_key(META_BILLING_URL)
    }
}
