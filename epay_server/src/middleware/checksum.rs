//! ePay checksum middleware for Actix Web.
//!
//! Every ePay request carries a `CHECKSUM` parameter: an HMAC-SHA1 over the other parameters, keyed with the secret
//! that the tenant shares with ePay. This middleware
//! 1. resolves the tenant's [`Environment`](epay_engine::db_types::Environment) from the request host,
//! 2. verifies the checksum with the environment's secret, and
//! 3. hands the environment and the parsed parameters to the handler as a [`VerifiedRequest`] request extension.
//!
//! Requests that fail any of these steps never reach the handler.
//!
//! Bill checks on `/init` for the configured probe IDNs are answered with "no bill due" straight away, before any of
//! the above. ePay uses them to check that the endpoint is alive.
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
    HttpResponse,
};
use epay_engine::{helpers::verify_checksum, EnvironmentStore};
use futures::future::LocalBoxFuture;
use log::{debug, trace, warn};

use crate::{
    data_objects::{EpayResponse, EpayStatus, VerifiedRequest, IDN_PARAM, TYPE_PARAM},
    errors::ServerError,
    helpers::{parse_params, tenant_from_host},
};

/// The only route that answers IDNs on the skip list.
const SKIP_CHECK_ROUTE: &str = "/init";

pub struct ChecksumMiddlewareFactory<E> {
    store: Arc<E>,
    skip_check_idns: Rc<Vec<String>>,
}

impl<E> ChecksumMiddlewareFactory<E> {
    pub fn new(store: Arc<E>, skip_check_idns: Vec<String>) -> Self {
        Self { store, skip_check_idns: Rc::new(skip_check_idns) }
    }
}

impl<S, B, E> Transform<S, ServiceRequest> for ChecksumMiddlewareFactory<E>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    E: EnvironmentStore + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = ChecksumMiddlewareService<S, E>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ChecksumMiddlewareService {
            store: Arc::clone(&self.store),
            skip_check_idns: Rc::clone(&self.skip_check_idns),
            service: Rc::new(service),
        }))
    }
}

pub struct ChecksumMiddlewareService<S, E> {
    store: Arc<E>,
    skip_check_idns: Rc<Vec<String>>,
    service: Rc<S>,
}

impl<S, B, E> Service<ServiceRequest> for ChecksumMiddlewareService<S, E>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    E: EnvironmentStore + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let store = Arc::clone(&self.store);
        let skip_check_idns = Rc::clone(&self.skip_check_idns);
        Box::pin(async move {
            let params = parse_params(req.query_string());
            let first = |key: &str| params.get(key).and_then(|v| v.first()).map(String::as_str);
            let is_skip_route = req.path().trim_end_matches('/').ends_with(SKIP_CHECK_ROUTE);
            if let (true, Some("CHECK"), Some(idn)) = (is_skip_route, first(TYPE_PARAM), first(IDN_PARAM)) {
                if skip_check_idns.iter().any(|s| s == idn) {
                    debug!("🔐️ Bill check for probe IDN {idn}. Answering without checks.");
                    let response = EpayResponse::new(EpayStatus::NoBillDue).with_idn(idn);
                    return Ok(req.into_response(HttpResponse::Ok().json(response)).map_into_right_body());
                }
            }
            let tenant = tenant_from_host(req.connection_info().host());
            trace!("🔐️ Checking ePay checksum for tenant '{tenant}'");
            let environment = store.get(&tenant).await.map_err(|e| {
                warn!("🔐️ No usable environment for tenant '{tenant}'. {e}");
                ServerError::from(e)
            })?;
            verify_checksum(&params, environment.epay_secret.reveal()).map_err(|e| {
                warn!("🔐️ Rejecting request for tenant '{tenant}'. {e}");
                ServerError::from(e)
            })?;
            trace!("🔐️ Checksum check for request ✅️");
            req.extensions_mut().insert(VerifiedRequest::new(environment, params));
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
