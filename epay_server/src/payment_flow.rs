//! The three ePay operations, as seen from the bridge.
//!
//! Each function picks the billing back-end for the request, relays the operation and turns the outcome into an ePay
//! response. Errors are returned as [`ServerError`]s, which carry their own ePay status.
use epay_billing::{BillingClient, ClientFactory};
use epay_common::{amount_from_minor_units, amount_to_minor_units, parse_list};
use epay_engine::PaymentOrderStore;
use log::*;

use crate::{
    data_objects::{EpayResponse, EpayStatus, VerifiedRequest, AMOUNT_PARAM, IDN_PARAM, INVOICES_PARAM, TID_PARAM},
    errors::ServerError,
};

/// `TYPE=CHECK`: how much does the subscriber owe? Nothing owed is answered with "no bill due".
pub async fn check_bill<S: PaymentOrderStore>(
    request: &VerifiedRequest,
    factory: &ClientFactory<S>,
) -> Result<EpayResponse, ServerError> {
    let idn = request.required_param(IDN_PARAM)?;
    let client = factory.create(&request.environment, idn)?;
    let bill = client.check_bill(idn).await.map_err(|e| {
        debug!("💻️ Bill check for {idn} on {} failed. {e}", client.billing_system());
        e
    })?;
    let amount = amount_to_minor_units(bill.amount)?;
    if amount <= 0 {
        debug!("💻️ {idn} owes nothing");
        return Ok(EpayResponse::new(EpayStatus::NoBillDue).with_idn(idn));
    }
    debug!("💻️ {idn} owes {}", bill.amount);
    Ok(EpayResponse::success().with_idn(idn).with_bill(bill.subscriber_name, amount))
}

/// `TYPE=BILLING` on `/init`: ePay is about to take a payment. All parameters but the checksum travel to the
/// back-end as metadata.
pub async fn create_payment_order<S: PaymentOrderStore>(
    request: &VerifiedRequest,
    factory: &ClientFactory<S>,
) -> Result<EpayResponse, ServerError> {
    let idn = request.required_param(IDN_PARAM)?;
    let amount = amount_from_minor_units(request.required_param(AMOUNT_PARAM)?)?;
    let client = factory.create(&request.environment, idn)?;
    let tid = client.create_payment_order(idn, amount, &request.metadata()).await?;
    info!("💻️ Payment order {tid} for {amount} created for {idn} on {}", client.billing_system());
    Ok(EpayResponse::success().with_idn(idn).with_tid(tid))
}

/// `TYPE=BILLING` on `/confirm`: ePay has taken the money. `INVOICES` optionally lists invoice references to associate
/// with the order.
pub async fn confirm_payment_order<S: PaymentOrderStore>(
    request: &VerifiedRequest,
    factory: &ClientFactory<S>,
) -> Result<EpayResponse, ServerError> {
    let tid = request.required_param(TID_PARAM)?;
    // Confirmations do not always carry the IDN. Without it, auto-detection falls back on the environment alone.
    let idn = request.param(IDN_PARAM).unwrap_or_default();
    let invoices = parse_list(request.param(INVOICES_PARAM).unwrap_or_default());
    let client = factory.create(&request.environment, idn)?;
    client.confirm_payment_order(tid, &invoices).await?;
    info!("💻️ Payment order {tid} confirmed on {}", client.billing_system());
    Ok(EpayResponse::success().with_tid(tid))
}
