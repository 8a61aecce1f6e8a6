//! The storage contracts of the ePay engine.
//!
//! * [`PaymentOrderStore`] persists [`PaymentOrderRecord`](crate::db_types::PaymentOrderRecord)s keyed by transaction
//!   id. It is the only shared mutable state in the bridge.
//! * [`EnvironmentStore`] resolves the billing configuration ([`Environment`](crate::db_types::Environment)) for a
//!   tenant.
mod environment_store;
mod payment_order_store;

pub use environment_store::{EnvironmentStore, EnvironmentStoreError};
pub use payment_order_store::{PaymentOrderStore, PaymentOrderStoreError};
