use actix_web::http::StatusCode;
use chrono::Utc;
use epay_billing::{BillingSystem, ClientFactory};
use epay_engine::{
    db_types::{PaymentOrderRecord, META_API_KEY, META_BILLING_URL},
    MemoryPaymentOrderStore,
    PaymentOrderStore,
};

use super::helpers::{environment, environments_serving, get_request, signed_query, SECRET};

const UNREACHABLE_UCRM: &[(&str, &str)] = &[(META_BILLING_URL, "http://127.0.0.1:1/api/v1.0"), (META_API_KEY, "key")];

fn auto_factory() -> ClientFactory<MemoryPaymentOrderStore> {
    ClientFactory::new(MemoryPaymentOrderStore::new())
}

fn uri(path: &str, pairs: &[(&str, &str)]) -> String {
    format!("/v1/pay/{path}?{}", signed_query(pairs, SECRET))
}

#[actix_web::test]
async fn unsupported_request_type() {
    let environments = environments_serving(environment(UNREACHABLE_UCRM));
    let uri = uri("init", &[("TYPE", "REFUND"), ("IDN", "ACC-42")]);
    let (status, body) = get_request(environments, auto_factory(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"STATUS":"96"}"#);
}

#[actix_web::test]
async fn confirm_rejects_bill_checks() {
    let environments = environments_serving(environment(UNREACHABLE_UCRM));
    let uri = uri("confirm", &[("TYPE", "CHECK"), ("IDN", "ACC-42")]);
    let (status, body) = get_request(environments, auto_factory(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"STATUS":"96"}"#);
}

#[actix_web::test]
async fn missing_idn() {
    let environments = environments_serving(environment(UNREACHABLE_UCRM));
    let uri = uri("init", &[("TYPE", "CHECK")]);
    let (status, _) = get_request(environments, auto_factory(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_amount() {
    let environments = environments_serving(environment(UNREACHABLE_UCRM));
    let uri = uri("init", &[("TYPE", "BILLING"), ("IDN", "ACC-42"), ("AMOUNT", "12.50")]);
    let (status, body) = get_request(environments, auto_factory(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"STATUS":"96"}"#);
}

#[actix_web::test]
async fn telcong_without_credentials() {
    let environments = environments_serving(environment(&[]));
    let factory = ClientFactory::with_billing_system(MemoryPaymentOrderStore::new(), BillingSystem::TelcoNg);
    let uri = uri("init", &[("TYPE", "CHECK"), ("IDN", "1234566")]);
    let (status, body) = get_request(environments, factory, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"STATUS":"96"}"#);
}

#[actix_web::test]
async fn unreachable_billing_system() {
    let environments = environments_serving(environment(UNREACHABLE_UCRM));
    let uri = uri("init", &[("TYPE", "CHECK"), ("IDN", "ACC-42")]);
    let (status, body) = get_request(environments, auto_factory(), &uri).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, r#"{"STATUS":"80"}"#);
}

#[actix_web::test]
async fn confirm_unknown_transaction() {
    let environments = environments_serving(environment(UNREACHABLE_UCRM));
    let uri = uri("confirm", &[("TYPE", "BILLING"), ("TID", "EP20240101120000000001")]);
    let (status, body) = get_request(environments, auto_factory(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"STATUS":"14"}"#);
}

#[actix_web::test]
async fn confirm_is_idempotent() {
    let store = MemoryPaymentOrderStore::new();
    let mut record =
        PaymentOrderRecord::new("EP20240101120000000002", "ACC-42", "20.00").with_customer("5", "Jane Doe");
    record.mark_processed(Utc::now(), &["10".to_string()]);
    store.put(&record).await.unwrap();
    let environments = environments_serving(environment(UNREACHABLE_UCRM));
    // The billing system is unreachable, so only a no-op confirmation can succeed
    let uri = uri("confirm", &[("TYPE", "BILLING"), ("TID", "EP20240101120000000002"), ("IDN", "ACC-42")]);
    let (status, body) = get_request(environments, ClientFactory::new(store), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"STATUS":"00","TID":"EP20240101120000000002"}"#);
}
