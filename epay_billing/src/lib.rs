//! Billing back-end clients for the ePay bridge.
//!
//! Every back-end exposes the same three operations through the [`BillingClient`] trait: check the amount a
//! subscriber owes, create a payment order, and confirm it once ePay has taken the money. Two back-ends exist:
//!
//! * [`TelcoNgClient`] talks to the TelcoNG billing API with OAuth2 service-account credentials. It keeps no state of
//!   its own.
//! * [`UcrmClient`] talks to the UCRM REST API and records each payment order in a
//!   [`PaymentOrderStore`](epay_engine::PaymentOrderStore) so that confirmations can be reconciled and replayed safely.
//!
//! [`ClientFactory`] decides which back-end serves a request and builds the client for it.
mod error;
mod factory;
mod order_locks;
mod traits;

#[cfg(test)]
mod test_keys;

pub mod telcong;
pub mod ucrm;

pub use error::BillingError;
pub use factory::{
    select_billing_system,
    BillingBackend,
    BillingSystem,
    ClientFactory,
    ClientOptions,
    DEFAULT_BILLING_TIMEOUT,
};
pub use order_locks::{OrderLockGuard, OrderLocks};
pub use telcong::TelcoNgClient;
pub use traits::{Bill, BillingClient};
pub use ucrm::{MetadataPolicy, UcrmClient, UcrmSettings};
