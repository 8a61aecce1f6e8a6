use std::{collections::HashMap, sync::Arc};

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use epay_billing::ClientFactory;
use epay_common::Secret;
use epay_engine::{
    db_types::{Environment, RequestParams},
    helpers::calculate_checksum,
    PaymentOrderStore,
};
use log::debug;

use super::mocks::MockEnvironments;
use crate::{routes::health, server::configure_payment_routes};

pub const TENANT: &str = "pay.example.com";
pub const SECRET: &str = "epay-shared-secret";
pub const PROBE_IDN: &str = "1111111111";

pub fn environment(metadata: &[(&str, &str)]) -> Environment {
    Environment {
        name: TENANT.to_string(),
        epay_secret: Secret::new(SECRET.to_string()),
        metadata: metadata.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>(),
        ..Default::default()
    }
}

/// An environment store that serves `env` for [`TENANT`].
pub fn environments_serving(env: Environment) -> MockEnvironments {
    let mut environments = MockEnvironments::new();
    environments.expect_get().withf(|tenant| tenant == TENANT).returning(move |_| Ok(env.clone()));
    environments
}

/// Builds a query string from `pairs` and appends the checksum computed with `secret`.
pub fn signed_query(pairs: &[(&str, &str)], secret: &str) -> String {
    let mut params = RequestParams::new();
    for (k, v) in pairs {
        params.entry(k.to_string()).or_default().push(v.to_string());
    }
    let checksum = calculate_checksum(&params, secret);
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.extend_pairs(pairs.iter().copied());
    query.append_pair("CHECKSUM", &checksum);
    query.finish()
}

pub async fn get_request<S>(
    environments: MockEnvironments,
    factory: ClientFactory<S>,
    uri: &str,
) -> (StatusCode, String)
where
    S: PaymentOrderStore + 'static,
{
    let _ = env_logger::try_init();
    let environments = Arc::new(environments);
    let app = App::new()
        .app_data(web::Data::new(factory))
        .service(health)
        .configure(|cfg| configure_payment_routes::<MockEnvironments, S>(cfg, environments, vec![PROBE_IDN.into()]));
    let service = test::init_service(app).await;
    let req = TestRequest::get().uri(uri).insert_header(("Host", TENANT)).to_request();
    debug!("Making request to {uri}");
    match test::try_call_service(&service, req).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = res.into_body().try_into_bytes().unwrap();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}
