use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub amount: Decimal,
    #[serde(default)]
    pub subscriber_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest<'a> {
    pub idn: &'a str,
    pub amount: Decimal,
    pub metadata: &'a HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOrderRequest<'a> {
    pub invoices: &'a [String],
}
