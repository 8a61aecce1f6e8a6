//! Single-tenant environment configuration, read from process environment variables.
//!
//! | Variable                     | Environment field                      |
//! |------------------------------|----------------------------------------|
//! | `TELCONG_JWT_KEY`            | `billing_jwt_key` and `billing_key`    |
//! | `TELCONG_BILLING_URL`        | `billing_url`                          |
//! | `EPAY_SECRET`                | `epay_secret` (required)               |
//! | `EPAY_MERCHANT_ID`           | `merchant_id`                          |
//! | `UCRM_BILLING_URL`           | `metadata["billingUrl"]`               |
//! | `UCRM_API_KEY`               | `metadata["apiKey"]`                   |
//! | `UCRM_METHOD_ID`             | `metadata["methodId"]`                 |
//! | `UCRM_PROVIDER_NAME`         | `metadata["providerName"]`             |
//! | `UCRM_PROVIDER_PAYMENT_ID`   | `metadata["providerPaymentId"]`        |
//! | `UCRM_PROVIDER_PAYMENT_TIME` | `metadata["providerPaymentTime"]`      |
//! | `UCRM_ORGANIZATION_ID`       | `metadata["organizationId"]`           |
//!
//! Unset or empty UCRM variables are left out of the metadata map altogether.
use std::{collections::HashMap, env};

use epay_common::Secret;
use log::*;

use crate::{
    db_types::{
        Environment,
        META_API_KEY,
        META_BILLING_URL,
        META_METHOD_ID,
        META_ORGANIZATION_ID,
        META_PROVIDER_NAME,
        META_PROVIDER_PAYMENT_ID,
        META_PROVIDER_PAYMENT_TIME,
    },
    traits::{EnvironmentStore, EnvironmentStoreError},
};

const UCRM_METADATA_VARS: [(&str, &str); 7] = [
    ("UCRM_BILLING_URL", META_BILLING_URL),
    ("UCRM_API_KEY", META_API_KEY),
    ("UCRM_METHOD_ID", META_METHOD_ID),
    ("UCRM_PROVIDER_NAME", META_PROVIDER_NAME),
    ("UCRM_PROVIDER_PAYMENT_ID", META_PROVIDER_PAYMENT_ID),
    ("UCRM_PROVIDER_PAYMENT_TIME", META_PROVIDER_PAYMENT_TIME),
    ("UCRM_ORGANIZATION_ID", META_ORGANIZATION_ID),
];

/// An [`EnvironmentStore`] for single-tenant deployments. The tenant name is ignored and the variables are re-read on
/// every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironmentStore;

impl ProcessEnvironmentStore {
    pub fn new() -> Self {
        Self
    }
}

impl EnvironmentStore for ProcessEnvironmentStore {
    async fn get(&self, _tenant: &str) -> Result<Environment, EnvironmentStoreError> {
        environment_from_vars(|name| env::var(name).ok())
    }
}

/// Builds an [`Environment`] from a variable lookup function.
pub fn environment_from_vars<F>(lookup: F) -> Result<Environment, EnvironmentStoreError>
where F: Fn(&str) -> Option<String> {
    let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let epay_secret = var("EPAY_SECRET").ok_or_else(|| {
        error!("🪛️ EPAY_SECRET is not set. No ePay request can be verified until it is.");
        EnvironmentStoreError::NotConfigured("EPAY_SECRET is not set".to_string())
    })?;
    let metadata = UCRM_METADATA_VARS
        .iter()
        .filter_map(|(name, key)| var(name).map(|v| (key.to_string(), v)))
        .collect::<HashMap<String, String>>();
    let jwt_key = var("TELCONG_JWT_KEY").unwrap_or_default();
    trace!("🪛️ Loaded environment from process variables. UCRM metadata keys: {:?}", metadata.keys());
    Ok(Environment {
        name: String::default(),
        billing_jwt_key: Secret::new(jwt_key.clone()),
        billing_key: Secret::new(jwt_key),
        billing_url: var("TELCONG_BILLING_URL").unwrap_or_default(),
        epay_secret: Secret::new(epay_secret),
        merchant_id: var("EPAY_MERCHANT_ID").unwrap_or_default(),
        metadata,
    })
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn telcong_environment() {
        let env = environment_from_vars(lookup(&[
            ("TELCONG_JWT_KEY", "{\"type\":\"service_account\"}"),
            ("TELCONG_BILLING_URL", "https://billing.example.com"),
            ("EPAY_SECRET", "s3cr3t"),
            ("EPAY_MERCHANT_ID", "D123"),
        ]))
        .unwrap();
        assert_eq!(env.billing_jwt_key.reveal(), "{\"type\":\"service_account\"}");
        assert_eq!(env.billing_key.reveal(), env.billing_jwt_key.reveal());
        assert_eq!(env.billing_url, "https://billing.example.com");
        assert_eq!(env.epay_secret.reveal(), "s3cr3t");
        assert_eq!(env.merchant_id, "D123");
        assert!(env.metadata.is_empty());
        assert!(env.has_telcong_config());
    }

    #[test]
    fn ucrm_metadata() {
        let env = environment_from_vars(lookup(&[
            ("EPAY_SECRET", "s3cr3t"),
            ("UCRM_BILLING_URL", "https://ucrm.example.com/api/v1.0"),
            ("UCRM_API_KEY", "key"),
            ("UCRM_METHOD_ID", "d8c1eae9-d41d-479f-aeaf-38497975d7b3"),
            ("UCRM_PROVIDER_NAME", "ePay"),
            ("UCRM_PROVIDER_PAYMENT_ID", "providerPaymentId"),
            ("UCRM_PROVIDER_PAYMENT_TIME", "providerPaymentTime"),
            ("UCRM_ORGANIZATION_ID", ""),
        ]))
        .unwrap();
        assert_eq!(env.metadata.len(), 6);
        assert_eq!(env.metadata_value(META_BILLING_URL), Some("https://ucrm.example.com/api/v1.0"));
        assert_eq!(env.metadata_value(META_PROVIDER_NAME), Some("ePay"));
        assert_eq!(env.metadata_value(META_ORGANIZATION_ID), None);
        assert!(env.has_ucrm_config());
        assert!(!env.has_telcong_config());
    }

    #[test]
    fn missing_secret() {
        let err = environment_from_vars(lookup(&[("TELCONG_BILLING_URL", "https://billing.example.com")])).unwrap_err();
        assert!(matches!(err, EnvironmentStoreError::NotConfigured(_)));
    }
}
