use thiserror::Error;

use crate::db_types::PaymentOrderRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentOrderStoreError {
    #[error("Payment order {0} not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Durable storage for payment orders.
///
/// `put` is the only mutation. It replaces the whole record stored under the transaction id, so updating an order is a
/// read-modify-write (`get`, change, `put`) that the caller must serialise per transaction id. Stores give no
/// guarantees about concurrent writers of the same key beyond "last `put` wins".
#[allow(async_fn_in_trait)]
pub trait PaymentOrderStore: Clone {
    /// Inserts or fully replaces the record stored under `order.transaction_id`.
    async fn put(&self, order: &PaymentOrderRecord) -> Result<(), PaymentOrderStoreError>;

    /// Fetches the record for `transaction_id`. An unknown transaction id is always reported as
    /// [`PaymentOrderStoreError::NotFound`].
    async fn get(&self, transaction_id: &str) -> Result<PaymentOrderRecord, PaymentOrderStoreError>;
}
