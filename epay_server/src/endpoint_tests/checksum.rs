use actix_web::http::StatusCode;
use epay_billing::{BillingSystem, ClientFactory};
use epay_engine::{EnvironmentStoreError, MemoryPaymentOrderStore};

use super::{
    helpers::{environment, environments_serving, get_request, signed_query, PROBE_IDN, SECRET},
    mocks::MockEnvironments,
};

fn factory() -> ClientFactory<MemoryPaymentOrderStore> {
    ClientFactory::with_billing_system(MemoryPaymentOrderStore::new(), BillingSystem::TelcoNg)
}

#[actix_web::test]
async fn health() {
    let (status, body) = get_request(MockEnvironments::new(), factory(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[actix_web::test]
async fn missing_checksum() {
    let environments = environments_serving(environment(&[]));
    let (status, body) = get_request(environments, factory(), "/v1/pay/init?TYPE=CHECK&IDN=1234566").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"STATUS":"93"}"#);
}

#[actix_web::test]
async fn checksum_with_the_wrong_secret() {
    let environments = environments_serving(environment(&[]));
    let query = signed_query(&[("TYPE", "CHECK"), ("IDN", "1234566")], "not-the-secret");
    let (status, body) = get_request(environments, factory(), &format!("/v1/pay/init?{query}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"STATUS":"93"}"#);
}

#[actix_web::test]
async fn tampered_parameters() {
    let environments = environments_serving(environment(&[]));
    let query = signed_query(&[("TYPE", "BILLING"), ("IDN", "1234566"), ("AMOUNT", "100")], SECRET);
    let query = query.replace("AMOUNT=100", "AMOUNT=1");
    let (status, _) = get_request(environments, factory(), &format!("/v1/pay/init?{query}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn probe_idn_skips_all_checks() {
    let mut environments = MockEnvironments::new();
    environments.expect_get().never();
    let uri = format!("/v1/pay/init?TYPE=CHECK&IDN={PROBE_IDN}");
    let (status, body) = get_request(environments, factory(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!(r#"{{"STATUS":"62","IDN":"{PROBE_IDN}"}}"#));
}

#[actix_web::test]
async fn probe_idn_is_only_skipped_for_bill_checks() {
    let environments = environments_serving(environment(&[]));
    let uri = format!("/v1/pay/init?TYPE=BILLING&IDN={PROBE_IDN}&AMOUNT=100");
    let (status, _) = get_request(environments, factory(), &uri).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_tenant() {
    let mut environments = MockEnvironments::new();
    environments.expect_get().returning(|tenant| Err(EnvironmentStoreError::NotFound(tenant.to_string())));
    let query = signed_query(&[("TYPE", "CHECK"), ("IDN", "1234566")], SECRET);
    let (status, body) = get_request(environments, factory(), &format!("/v1/pay/init?{query}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"STATUS":"93"}"#);
}

#[actix_web::test]
async fn unconfigured_environment() {
    let mut environments = MockEnvironments::new();
    environments.expect_get().returning(|_| Err(EnvironmentStoreError::NotConfigured("EPAY_SECRET is not set".into())));
    let query = signed_query(&[("TYPE", "CHECK"), ("IDN", "1234566")], SECRET);
    let (status, body) = get_request(environments, factory(), &format!("/v1/pay/init?{query}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"STATUS":"96"}"#);
}

#[actix_web::test]
async fn skip_list_only_applies_to_init() {
    let environments = environments_serving(environment(&[]));
    let uri = format!("/v1/pay/confirm?TYPE=CHECK&IDN={PROBE_IDN}");
    let (status, body) = get_request(environments, factory(), &uri).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"STATUS":"93"}"#);
}
