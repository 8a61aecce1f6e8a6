//! The UCRM billing API.
//!
//! UCRM identifies subscribers either by contract code (searched with `query`) or by their user identifier
//! (`userIdent`). The amount due is the sum of `amountToPay` over the subscriber's unpaid and partially paid invoices.
//!
//! Unlike TelcoNG, UCRM has no notion of a pending payment order, so the client keeps one itself: creating an order
//! stores a [`PaymentOrderRecord`](epay_engine::db_types::PaymentOrderRecord), and confirming it posts the payment to
//! UCRM and marks the record as processed. Confirming an already processed order is a no-op, so ePay may safely
//! repeat a confirmation.
mod api;
mod data_objects;
mod settings;

pub use api::{UcrmClient, TRANSACTION_ID_PARAM};
pub use data_objects::{Invoice, UcrmCustomer};
pub use settings::{MetadataPolicy, PaymentProvider, UcrmSettings};
