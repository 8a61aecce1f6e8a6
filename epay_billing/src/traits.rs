use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::BillingError;

/// The outcome of a bill check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// The amount currently due. Zero means there is nothing to pay.
    pub amount: Decimal,
    pub subscriber_name: String,
}

/// The capability every billing back-end offers the ePay bridge.
#[allow(async_fn_in_trait)]
pub trait BillingClient {
    /// Looks up what the subscriber identified by `idn` owes. This never changes any state.
    async fn check_bill(&self, idn: &str) -> Result<Bill, BillingError>;

    /// Registers a payment of `amount` by `idn`. `metadata` carries the remaining ePay request parameters. Returns the
    /// transaction id under which the order will later be confirmed.
    async fn create_payment_order(
        &self,
        idn: &str,
        amount: Decimal,
        metadata: &HashMap<String, String>,
    ) -> Result<String, BillingError>;

    /// Marks a previously created order as settled.
    async fn confirm_payment_order(&self, transaction_id: &str, invoice_refs: &[String]) -> Result<(), BillingError>;
}
