use std::{collections::HashMap, sync::Arc};

use log::trace;
use tokio::sync::RwLock;

use crate::{
    db_types::PaymentOrderRecord,
    traits::{PaymentOrderStore, PaymentOrderStoreError},
};

/// A [`PaymentOrderStore`] that lives in process memory. Records are lost on restart.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryPaymentOrderStore {
    orders: Arc<RwLock<HashMap<String, PaymentOrderRecord>>>,
}

impl MemoryPaymentOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

impl PaymentOrderStore for MemoryPaymentOrderStore {
    async fn put(&self, order: &PaymentOrderRecord) -> Result<(), PaymentOrderStoreError> {
        trace!("🗃️ Storing payment order {} in memory", order.transaction_id);
        self.orders.write().await.insert(order.transaction_id.clone(), order.clone());
        Ok(())
    }

    async fn get(&self, transaction_id: &str) -> Result<PaymentOrderRecord, PaymentOrderStoreError> {
        self.orders
            .read()
            .await
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| PaymentOrderStoreError::NotFound(transaction_id.to_string()))
    }
}
