//! Per-transaction locks.
//!
//! Payment-order stores only offer whole-record `put`s, so confirming an order is a read-modify-write. Two
//! confirmations of the same transaction racing each other would lose one of the updates (and could pay the same
//! order twice). [`OrderLocks`] serialises all work on one transaction id inside this process. Requests for different
//! transaction ids never wait on each other.
//!
//! The locks are process-local. Several server instances writing to the same store can still race; that deployment
//! relies on ePay not sending concurrent notifications for the same transaction.
use std::sync::Arc;

use dashmap::DashMap;
use log::trace;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
pub struct OrderLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no one else holds the lock for `transaction_id` and takes it. The lock is released when the guard
    /// is dropped.
    pub async fn lock(&self, transaction_id: &str) -> OrderLockGuard {
        let mutex = self.locks.entry(transaction_id.to_string()).or_default().clone();
        trace!("🔒️ Waiting for lock on transaction {transaction_id}");
        let guard = mutex.lock_owned().await;
        OrderLockGuard { transaction_id: transaction_id.to_string(), locks: self.clone(), guard: Some(guard) }
    }

    /// The number of transaction ids that currently have a lock entry.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

pub struct OrderLockGuard {
    transaction_id: String,
    locks: OrderLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for OrderLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map holds the mutex now, unless another task has cloned it while waiting for the lock
        self.locks.locks.remove_if(&self.transaction_id, |_, m| Arc::strong_count(m) == 1);
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn entries_are_removed_after_use() {
        let locks = OrderLocks::new();
        {
            let _guard = locks.lock("TXN1").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn same_transaction_is_serialised() {
        let locks = OrderLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));
        let tasks = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let inside = inside.clone();
                let max_inside = max_inside.clone();
                tokio::spawn(async move {
                    let _guard = locks.lock("TXN1").await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect::<Vec<_>>();
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn different_transactions_do_not_block() {
        let locks = OrderLocks::new();
        let _a = locks.lock("TXN1").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock("TXN2")).await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }
}
