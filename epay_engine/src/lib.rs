//! ePay Engine
//!
//! The core of the ePay billing bridge. This library is provider-agnostic: it knows how to trust an inbound ePay
//! request and how to persist payment orders, but nothing about the billing back-ends that ultimately own the
//! subscriber accounts.
//!
//! The library is divided into three sections:
//! 1. Request authenticity ([`mod@helpers`]). The ePay checksum protocol and the contract-code validator that is used
//!    as a routing signal when picking a billing back-end.
//! 2. The storage contracts ([`mod@traits`]). [`PaymentOrderStore`] persists payment orders keyed by transaction id
//!    and [`EnvironmentStore`] resolves the billing configuration for a tenant.
//! 3. Storage backends ([`mod@db`]). SQLite and in-memory payment-order stores, and SQLite and process-environment
//!    environment stores.
mod db;

pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use db::{memory::MemoryPaymentOrderStore, process_env::ProcessEnvironmentStore};
#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use traits::{EnvironmentStore, EnvironmentStoreError, PaymentOrderStore, PaymentOrderStoreError};
