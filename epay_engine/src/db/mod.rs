//! Storage backends for the ePay engine.
//!
//! * [`sqlite`] backs both [`PaymentOrderStore`](crate::PaymentOrderStore) and
//!   [`EnvironmentStore`](crate::EnvironmentStore) with a SQLite database. This is the backend used in multi-tenant
//!   deployments, and for payment orders in single-tenant UCRM deployments.
//! * [`memory`] is a process-local payment-order store.
//! * [`process_env`] reads a single tenant's environment from process environment variables.
pub mod memory;
pub mod process_env;

#[cfg(feature = "sqlite")]
pub mod sqlite;
