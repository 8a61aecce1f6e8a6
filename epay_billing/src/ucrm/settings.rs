use std::{collections::HashMap, fmt::Display, str::FromStr};

use epay_common::Secret;
use epay_engine::db_types::{
    META_API_KEY,
    META_BILLING_URL,
    META_METHOD_ID,
    META_ORGANIZATION_ID,
    META_PROVIDER_NAME,
    META_PROVIDER_PAYMENT_ID,
    META_PROVIDER_PAYMENT_TIME,
    UCRM_METADATA_KEYS,
};
use log::*;
use url::Url;

use crate::BillingError;

const DEFAULT_PAYMENT_ID_FIELD: &str = "providerPaymentId";
const DEFAULT_PAYMENT_TIME_FIELD: &str = "providerPaymentTime";

/// What to do when the UCRM metadata of an environment is incomplete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataPolicy {
    /// Missing fields become empty strings. The client fails with a configuration error when it first needs a field
    /// it cannot work without (the billing URL or the API key).
    #[default]
    Lenient,
    /// Every metadata field must be present and non-empty, and the billing URL must parse, before a client is built.
    Strict,
}

impl FromStr for MetadataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("'{other}' is not a metadata policy. Use 'lenient' or 'strict'.")),
        }
    }
}

impl Display for MetadataPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// How payments appear in UCRM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentProvider {
    /// The UCRM payment method the payments are booked under.
    pub method_id: String,
    /// Display name of the payment provider.
    pub name: String,
    /// Name of the payment field that receives the ePay transaction id.
    pub payment_id_field: String,
    /// Name of the payment field that receives the time the payment was confirmed.
    pub payment_time_field: String,
    /// When set, only clients of this organization are considered.
    pub organization_id: String,
}

impl PaymentProvider {
    pub fn payment_id_field(&self) -> &str {
        non_empty_or(&self.payment_id_field, DEFAULT_PAYMENT_ID_FIELD)
    }

    pub fn payment_time_field(&self) -> &str {
        non_empty_or(&self.payment_time_field, DEFAULT_PAYMENT_TIME_FIELD)
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

/// Typed UCRM configuration, extracted from an environment's metadata map.
#[derive(Debug, Clone, Default)]
pub struct UcrmSettings {
    pub billing_url: String,
    pub api_key: Secret<String>,
    pub provider: PaymentProvider,
}

impl UcrmSettings {
    pub fn from_metadata(metadata: &HashMap<String, String>, policy: MetadataPolicy) -> Result<Self, BillingError> {
        if policy == MetadataPolicy::Strict {
            let missing = UCRM_METADATA_KEYS
                .iter()
                .filter(|key| metadata.get(**key).map_or(true, |v| v.trim().is_empty()))
                .copied()
                .collect::<Vec<_>>();
            if !missing.is_empty() {
                warn!("🪛️ UCRM metadata is incomplete. Missing: {}", missing.join(", "));
                return Err(BillingError::Configuration(format!("Missing UCRM metadata: {}", missing.join(", "))));
            }
        }
        let field = |key: &str| metadata.get(key).cloned().unwrap_or_default();
        let settings = Self {
            billing_url: field(META_BILLING_URL),
            api_key: Secret::new(field(META_API_KEY)),
            provider: PaymentProvider {
                method_id: field(META_METHOD_ID),
                name: field(META_PROVIDER_NAME),
                payment_id_field: field(META_PROVIDER_PAYMENT_ID),
                payment_time_field: field(META_PROVIDER_PAYMENT_TIME),
                organization_id: field(META_ORGANIZATION_ID),
            },
        };
        if policy == MetadataPolicy::Strict {
            settings.base_url()?;
        }
        Ok(settings)
    }

    /// The parsed billing URL. Empty or malformed URLs are configuration errors.
    pub fn base_url(&self) -> Result<Url, BillingError> {
        if self.billing_url.trim().is_empty() {
            return Err(BillingError::Configuration("The UCRM billing URL is not configured".to_string()));
        }
        let url = Url::parse(&self.billing_url).map_err(|e| {
            BillingError::Configuration(format!("Invalid UCRM billing URL '{}': {e}", self.billing_url))
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(BillingError::Configuration(format!("UCRM billing URL '{url}' is not an HTTP URL")));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn full_metadata() -> HashMap<String, String> {
        [
            (META_BILLING_URL, "https://ucrm.example.com/api/v1.0"),
            (META_API_KEY, "key"),
            (META_METHOD_ID, "d8c1eae9-d41d-479f-aeaf-38497975d7b3"),
            (META_PROVIDER_NAME, "ePay"),
            (META_PROVIDER_PAYMENT_ID, "providerPaymentId"),
            (META_PROVIDER_PAYMENT_TIME, "providerPaymentTime"),
            (META_ORGANIZATION_ID, "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn complete_metadata() {
        for policy in [MetadataPolicy::Strict, MetadataPolicy::Lenient] {
            let settings = UcrmSettings::from_metadata(&full_metadata(), policy).unwrap();
            assert_eq!(settings.billing_url, "https://ucrm.example.com/api/v1.0");
            assert_eq!(settings.api_key.reveal(), "key");
            assert_eq!(settings.provider.name, "ePay");
            assert_eq!(settings.provider.organization_id, "1");
            assert_eq!(settings.base_url().unwrap().as_str(), "https://ucrm.example.com/api/v1.0");
        }
    }

    #[test]
    fn strict_policy_rejects_missing_fields() {
        let mut metadata = full_metadata();
        metadata.remove(META_METHOD_ID);
        metadata.insert(META_API_KEY.into(), "  ".into());
        let err = UcrmSettings::from_metadata(&metadata, MetadataPolicy::Strict).unwrap_err();
        match err {
            BillingError::Configuration(msg) => {
                assert!(msg.contains(META_METHOD_ID));
                assert!(msg.contains(META_API_KEY));
            },
            e => panic!("Unexpected error {e}"),
        }
    }

    #[test]
    fn strict_policy_rejects_malformed_url() {
        let mut metadata = full_metadata();
        metadata.insert(META_BILLING_URL.into(), "not a url".into());
        let err = UcrmSettings::from_metadata(&metadata, MetadataPolicy::Strict).unwrap_err();
        assert!(matches!(err, BillingError::Configuration(_)));
    }

    #[test]
    fn lenient_policy_defers_validation() {
        let metadata = HashMap::from([(META_BILLING_URL.to_string(), String::new())]);
        let settings = UcrmSettings::from_metadata(&metadata, MetadataPolicy::Lenient).unwrap();
        assert!(settings.api_key.is_empty());
        assert_eq!(settings.provider, PaymentProvider::default());
        assert!(matches!(settings.base_url(), Err(BillingError::Configuration(_))));
    }

    #[test]
    fn provider_field_names_default() {
        let provider = PaymentProvider::default();
        assert_eq!(provider.payment_id_field(), "providerPaymentId");
        assert_eq!(provider.payment_time_field(), "providerPaymentTime");
        let custom = PaymentProvider { payment_id_field: "epayTid".into(), ..Default::default() };
        assert_eq!(custom.payment_id_field(), "epayTid");
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("STRICT".parse::<MetadataPolicy>().unwrap(), MetadataPolicy::Strict);
        assert_eq!(" lenient".parse::<MetadataPolicy>().unwrap(), MetadataPolicy::Lenient);
        assert!("sometimes".parse::<MetadataPolicy>().is_err());
    }
}
