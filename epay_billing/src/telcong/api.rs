use std::{collections::HashMap, sync::Arc, time::Duration};

use log::*;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    data_objects::{BillResponse, ConfirmOrderRequest, NewOrderRequest, NewOrderResponse},
    oauth::TokenSource,
};
use crate::{Bill, BillingClient, BillingError};

#[derive(Debug, Clone)]
pub struct TelcoNgClient {
    base_url: Url,
    http: Client,
    tokens: Arc<TokenSource>,
}

impl TelcoNgClient {
    /// Builds a client from the service-account key in `jwt_key` and the API base URL. Either one being malformed is a
    /// configuration error. No network traffic happens here.
    pub fn new(jwt_key: &str, billing_url: &str, scope: &str, timeout: Duration) -> Result<Self, BillingError> {
        let tokens = TokenSource::from_service_account_json(jwt_key, scope, http_client(timeout)?)?;
        Self::with_token_source(billing_url, Arc::new(tokens), timeout)
    }

    /// Builds a client that shares `tokens`, and so its cached access token, with other clients.
    pub fn with_token_source(
        billing_url: &str,
        tokens: Arc<TokenSource>,
        timeout: Duration,
    ) -> Result<Self, BillingError> {
        let base_url = Url::parse(billing_url)
            .map_err(|e| BillingError::Configuration(format!("Invalid TelcoNG billing URL '{billing_url}': {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(BillingError::Configuration(format!("TelcoNG billing URL '{billing_url}' is not an HTTP URL")));
        }
        Ok(Self { base_url, http: http_client(timeout)?, tokens })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends the given path segments to the base URL. Segments are percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Result<Url, BillingError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BillingError::Configuration(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, BillingError> {
        let url = self.url(segments)?;
        let token = self.tokens.access_token().await?;
        trace!("📞️ TelcoNG {method} {url}");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response, BillingError> {
        let response = req.send().await?;
        match response.status() {
            s if s.is_success() => Ok(response),
            StatusCode::NOT_FOUND => {
                debug!("📞️ TelcoNG does not know {what}");
                Err(BillingError::NotFound(what.to_string()))
            },
            status => {
                let message = response.text().await.unwrap_or_default();
                warn!("📞️ TelcoNG request for {what} failed. {status}: {message}");
                Err(BillingError::Unavailable(format!("TelcoNG responded with {status}")))
            },
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, BillingError> {
        response.json::<T>().await.map_err(|e| BillingError::Unavailable(format!("Invalid TelcoNG response: {e}")))
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, BillingError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BillingError::Configuration(format!("Could not initialize HTTP client: {e}")))
}

impl BillingClient for TelcoNgClient {
    async fn check_bill(&self, idn: &str) -> Result<Bill, BillingError> {
        let req = self.request(Method::GET, &["v1", "epay", "bills", idn]).await?;
        let response = self.send(req, &format!("subscriber {idn}")).await?;
        let bill = Self::json::<BillResponse>(response).await?;
        debug!("📞️ TelcoNG subscriber {idn} owes {}", bill.amount);
        Ok(Bill { amount: bill.amount, subscriber_name: bill.subscriber_name })
    }

    async fn create_payment_order(
        &self,
        idn: &str,
        amount: Decimal,
        metadata: &HashMap<String, String>,
    ) -> Result<String, BillingError> {
        let body = NewOrderRequest { idn, amount, metadata };
        let req = self.request(Method::POST, &["v1", "epay", "orders"]).await?.json(&body);
        let response = self.send(req, &format!("subscriber {idn}")).await?;
        let order = Self::json::<NewOrderResponse>(response).await?;
        info!("📞️ TelcoNG payment order {} created for {idn}", order.transaction_id);
        Ok(order.transaction_id)
    }

    async fn confirm_payment_order(&self, transaction_id: &str, invoice_refs: &[String]) -> Result<(), BillingError> {
        let body = ConfirmOrderRequest { invoices: invoice_refs };
        let req = self.request(Method::POST, &["v1", "epay", "orders", transaction_id, "confirm"]).await?.json(&body);
        self.send(req, &format!("payment order {transaction_id}")).await?;
        info!("📞️ TelcoNG payment order {transaction_id} confirmed");
        Ok(())
    }
}
