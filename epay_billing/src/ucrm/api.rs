use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};
use epay_engine::{db_types::PaymentOrderRecord, helpers::is_contract_code, PaymentOrderStore, PaymentOrderStoreError};
use log::*;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use super::{
    data_objects::{Invoice, UcrmCustomer},
    settings::UcrmSettings,
};
use crate::{Bill, BillingClient, BillingError, OrderLocks};

const API_KEY_HEADER: &str = "X-Auth-App-Key";
const STATUS_UNPAID: &str = "1";
const STATUS_PARTIALLY_PAID: &str = "2";
/// Metadata key under which ePay may supply its own transaction id.
pub const TRANSACTION_ID_PARAM: &str = "TID";

#[derive(Debug, Clone)]
pub struct UcrmClient<S> {
    settings: UcrmSettings,
    http: Client,
    store: S,
    locks: OrderLocks,
}

impl<S> UcrmClient<S> {
    /// Builds a client. Settings are not validated here; see [`UcrmSettings::from_metadata`].
    pub fn new(settings: UcrmSettings, store: S, locks: OrderLocks, timeout: Duration) -> Result<Self, BillingError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BillingError::Configuration(format!("Could not initialize HTTP client: {e}")))?;
        Ok(Self { settings, http, store, locks })
    }

    pub fn settings(&self) -> &UcrmSettings {
        &self.settings
    }

    fn api_key(&self) -> Result<&str, BillingError> {
        let key = self.settings.api_key.reveal().trim();
        if key.is_empty() {
            return Err(BillingError::Configuration("The UCRM API key is not configured".to_string()));
        }
        Ok(key)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BillingError> {
        let mut url = self.settings.base_url()?;
        let base = self.settings.billing_url.as_str();
        url.path_segments_mut()
            .map_err(|_| BillingError::Configuration(format!("{base} cannot be used as a base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, BillingError> {
        let url = self.url(segments)?;
        let key = self.api_key()?;
        trace!("📞️ UCRM GET {url}");
        let response = self.http.get(url).header(API_KEY_HEADER, key).query(query).send().await?;
        let response = check_status(response, what).await?;
        response.json::<T>().await.map_err(|e| BillingError::Unavailable(format!("Invalid UCRM response: {e}")))
    }

    /// Finds the UCRM client that `idn` identifies. Contract codes are searched with a free-text query, anything else
    /// is matched against the client's user identifier.
    async fn find_customer(&self, idn: &str) -> Result<UcrmCustomer, BillingError> {
        let query = if is_contract_code(idn) {
            vec![("query", idn.to_string())]
        } else {
            vec![("userIdent", idn.to_string())]
        };
        let what = format!("subscriber {idn}");
        let customers = self.get_json::<Vec<UcrmCustomer>>(&["clients"], &query, &what).await?;
        let organization = &self.settings.provider.organization_id;
        customers.into_iter().find(|c| c.belongs_to(organization)).ok_or_else(|| {
            debug!("📞️ UCRM has no client for {idn}");
            BillingError::NotFound(what)
        })
    }

    async fn unpaid_invoices(&self, client_id: i64) -> Result<Vec<Invoice>, BillingError> {
        let query = [
            ("clientId", client_id.to_string()),
            ("statuses[]", STATUS_UNPAID.to_string()),
            ("statuses[]", STATUS_PARTIALLY_PAID.to_string()),
        ];
        self.get_json::<Vec<Invoice>>(&["invoices"], &query, &format!("invoices of client {client_id}")).await
    }

    fn payment_body(
        &self,
        record: &PaymentOrderRecord,
        client_id: i64,
        invoice_ids: &[i64],
        paid_at: DateTime<Utc>,
    ) -> Result<Value, BillingError> {
        let amount = record
            .amount
            .parse::<Decimal>()
            .ok()
            .and_then(|a| a.to_f64())
            .ok_or_else(|| BillingError::Unavailable(format!("Order {} has an invalid amount", record.transaction_id)))?;
        let provider = &self.settings.provider;
        let mut body = json!({
            "clientId": client_id,
            "methodId": provider.method_id,
            "amount": amount,
            "providerName": provider.name,
            "note": format!("ePay transaction {}", record.transaction_id),
            "applyToInvoicesAutomatically": invoice_ids.is_empty(),
        });
        if !invoice_ids.is_empty() {
            body["invoiceIds"] = json!(invoice_ids);
        }
        body[provider.payment_id_field()] = json!(record.transaction_id);
        body[provider.payment_time_field()] = json!(paid_at.to_rfc3339());
        Ok(body)
    }

    async fn post_payment(&self, body: &Value, transaction_id: &str) -> Result<(), BillingError> {
        let url = self.url(&["payments"])?;
        let key = self.api_key()?;
        trace!("📞️ UCRM POST {url}");
        let response = self.http.post(url).header(API_KEY_HEADER, key).json(body).send().await?;
        check_status(response, &format!("payment for order {transaction_id}")).await?;
        Ok(())
    }
}

impl<S: PaymentOrderStore> BillingClient for UcrmClient<S> {
    async fn check_bill(&self, idn: &str) -> Result<Bill, BillingError> {
        let customer = self.find_customer(idn).await?;
        let invoices = self.unpaid_invoices(customer.id).await?;
        let amount = invoices.iter().map(|i| i.amount_to_pay).sum::<Decimal>();
        debug!("📞️ UCRM client {} ({idn}) owes {amount} over {} invoices", customer.id, invoices.len());
        Ok(Bill { amount, subscriber_name: customer.display_name() })
    }

    async fn create_payment_order(
        &self,
        idn: &str,
        amount: Decimal,
        metadata: &HashMap<String, String>,
    ) -> Result<String, BillingError> {
        let transaction_id = match metadata.get(TRANSACTION_ID_PARAM).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(tid) => tid.to_string(),
            None => new_transaction_id(),
        };
        let _guard = self.locks.lock(&transaction_id).await;
        match self.store.get(&transaction_id).await {
            Ok(existing) if existing.subscriber_id != idn => {
                warn!(
                    "📞️ Payment order {transaction_id} belongs to {}, but {idn} tried to create it again",
                    existing.subscriber_id
                );
                return Err(BillingError::NotFound(format!(
                    "Payment order {transaction_id} does not belong to subscriber {idn}"
                )));
            },
            Ok(existing) => {
                info!("📞️ Payment order {transaction_id} already exists. Nothing to do.");
                return Ok(existing.transaction_id);
            },
            Err(PaymentOrderStoreError::NotFound(_)) => {},
            Err(e) => return Err(e.into()),
        }
        let customer = self.find_customer(idn).await?;
        let record = PaymentOrderRecord::new(transaction_id.clone(), idn.to_string(), amount.to_string())
            .with_customer(customer.id.to_string(), customer.display_name());
        self.store.put(&record).await?;
        info!("📞️ Payment order {transaction_id} created for UCRM client {} ({idn}) for {amount}", customer.id);
        Ok(transaction_id)
    }

    async fn confirm_payment_order(&self, transaction_id: &str, invoice_refs: &[String]) -> Result<(), BillingError> {
        let _guard = self.locks.lock(transaction_id).await;
        let mut record = self.store.get(transaction_id).await?;
        if record.is_processed() {
            info!("📞️ Payment order {transaction_id} was already processed. Nothing to do.");
            return Ok(());
        }
        let client_id = record.client_id.parse::<i64>().map_err(|_| {
            BillingError::Unavailable(format!("Order {transaction_id} has an invalid client id '{}'", record.client_id))
        })?;
        let invoices = self.unpaid_invoices(client_id).await?;
        let invoice_ids = invoices.iter().map(|i| i.id).collect::<Vec<_>>();
        let paid_at = Utc::now();
        let body = self.payment_body(&record, client_id, &invoice_ids, paid_at)?;
        self.post_payment(&body, transaction_id).await?;
        let mut associated = invoice_refs.to_vec();
        associated.extend(invoice_ids.iter().map(|id| id.to_string()));
        record.mark_processed(paid_at, &associated);
        if let Err(e) = self.store.put(&record).await {
            error!(
                "📞️ The UCRM payment for order {transaction_id} was posted, but the order could not be marked as \
                 processed. {e}"
            );
            return Err(e.into());
        }
        info!("📞️ Payment order {transaction_id} confirmed for UCRM client {client_id}");
        Ok(())
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response, BillingError> {
    match response.status() {
        s if s.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(BillingError::NotFound(what.to_string())),
        status => {
            let message = response.text().await.unwrap_or_default();
            warn!("📞️ UCRM request for {what} failed. {status}: {message}");
            Err(BillingError::Unavailable(format!("UCRM responded with {status}")))
        },
    }
}

fn new_transaction_id() -> String {
    let suffix = rand::thread_rng().gen_range(0..1_000_000);
    format!("EP{}{suffix:06}", Utc::now().format("%Y%m%d%H%M%S"))
}
