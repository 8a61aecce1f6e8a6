//! A whole payment against a fake UCRM, with orders kept in SQLite.
use std::sync::Mutex;

use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use epay_billing::ClientFactory;
use epay_engine::{
    db_types::{META_API_KEY, META_BILLING_URL, META_METHOD_ID, META_PROVIDER_NAME},
    test_utils::{prepare_test_env, random_db_path},
    PaymentOrderStore,
    SqliteDatabase,
};
use serde_json::{json, Value};

use super::helpers::{environment, environments_serving, get_request, signed_query, SECRET};

const API_KEY: &str = "ucrm-key";
const TID: &str = "EP20240601101500123456";

#[derive(Default)]
struct FakeUcrm {
    payments: Mutex<Vec<Value>>,
}

fn query_value(req: &HttpRequest, key: &str) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes()).find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers().get("X-Auth-App-Key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn clients(req: HttpRequest) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    match query_value(&req, "userIdent").as_deref() {
        Some("ACC-42") => {
            HttpResponse::Ok().json(json!([{"id": 5, "clientType": 1, "firstName": "Jane", "lastName": "Doe"}]))
        },
        Some("ACC-7") => HttpResponse::Ok().json(json!([{"id": 7, "clientType": 2, "companyName": "Acme Ltd"}])),
        _ => HttpResponse::Ok().json(json!([])),
    }
}

async fn invoices(req: HttpRequest) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    match query_value(&req, "clientId").as_deref() {
        Some("5") => HttpResponse::Ok().json(json!([
            {"id": 10, "number": "2024-0010", "amountToPay": 12.40},
            {"id": 11, "number": "2024-0011", "amountToPay": 7.60},
        ])),
        _ => HttpResponse::Ok().json(json!([])),
    }
}

async fn payments(req: HttpRequest, body: web::Json<Value>, state: web::Data<FakeUcrm>) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let mut payments = state.payments.lock().unwrap();
    payments.push(body.into_inner());
    HttpResponse::Created().json(json!({"id": payments.len()}))
}

async fn start_fake_ucrm() -> (String, web::Data<FakeUcrm>) {
    let state = web::Data::new(FakeUcrm::default());
    let data = state.clone();
    let server = HttpServer::new(move || {
        App::new().app_data(data.clone()).service(
            web::scope("/api/v1.0")
                .route("/clients", web::get().to(clients))
                .route("/invoices", web::get().to(invoices))
                .route("/payments", web::post().to(payments)),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    (format!("http://{addr}/api/v1.0"), state)
}

async fn setup() -> (String, web::Data<FakeUcrm>, SqliteDatabase) {
    let (url, state) = start_fake_ucrm().await;
    let db = prepare_test_env(&random_db_path()).await;
    (url, state, db)
}

async fn call(url: &str, db: &SqliteDatabase, path: &str, pairs: &[(&str, &str)]) -> (StatusCode, String) {
    let env = environment(&[
        (META_BILLING_URL, url),
        (META_API_KEY, API_KEY),
        (META_METHOD_ID, "d8c1eae9-d41d-479f-aeaf-38497975d7b3"),
        (META_PROVIDER_NAME, "ePay"),
    ]);
    let uri = format!("/v1/pay/{path}?{}", signed_query(pairs, SECRET));
    get_request(environments_serving(env), ClientFactory::new(db.clone()), &uri).await
}

#[actix_web::test]
async fn bill_check() {
    let (url, _, db) = setup().await;
    let (status, body) = call(&url, &db, "init", &[("TYPE", "CHECK"), ("IDN", "ACC-42")]).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"STATUS": "00", "IDN": "ACC-42", "SHORTDESC": "Jane Doe", "AMOUNT": 2000}));
}

#[actix_web::test]
async fn nothing_owed() {
    let (url, _, db) = setup().await;
    let (status, body) = call(&url, &db, "init", &[("TYPE", "CHECK"), ("IDN", "ACC-7")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"STATUS":"62","IDN":"ACC-7"}"#);
}

#[actix_web::test]
async fn unknown_subscriber() {
    let (url, _, db) = setup().await;
    let (status, body) = call(&url, &db, "init", &[("TYPE", "CHECK"), ("IDN", "ACC-0")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"STATUS":"14"}"#);
}

#[actix_web::test]
async fn create_and_confirm() {
    let (url, state, db) = setup().await;
    let init = [("TYPE", "BILLING"), ("IDN", "ACC-42"), ("AMOUNT", "2000"), ("TID", TID)];
    let (status, body) = call(&url, &db, "init", &init).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!(r#"{{"STATUS":"00","IDN":"ACC-42","TID":"{TID}"}}"#));

    let order = PaymentOrderStore::get(&db, TID).await.unwrap();
    assert_eq!(order.subscriber_id, "ACC-42");
    assert_eq!(order.client_id, "5");
    assert_eq!(order.amount, "20.00");
    assert!(!order.is_processed());

    let confirm = [("TYPE", "BILLING"), ("TID", TID), ("IDN", "ACC-42"), ("INVOICES", "REF-1")];
    let (status, body) = call(&url, &db, "confirm", &confirm).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!(r#"{{"STATUS":"00","TID":"{TID}"}}"#));

    let order = PaymentOrderStore::get(&db, TID).await.unwrap();
    assert!(order.is_processed());
    assert_eq!(order.invoice_ids, vec!["REF-1", "10", "11"]);
    {
        let payments = state.payments.lock().unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0]["clientId"], 5);
        assert_eq!(payments[0]["providerPaymentId"], TID);
    }

    // ePay retries confirmations. The second one must not pay again.
    let (status, _) = call(&url, &db, "confirm", &confirm).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.payments.lock().unwrap().len(), 1);
}
