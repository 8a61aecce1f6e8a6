use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{environments, new_pool, payment_orders, SqliteDatabaseError};
use crate::{
    db_types::{Environment, PaymentOrderRecord},
    traits::{EnvironmentStore, EnvironmentStoreError, PaymentOrderStore, PaymentOrderStoreError},
};

/// A SQLite-backed [`PaymentOrderStore`] and [`EnvironmentStore`].
///
/// Clones share the same connection pool.
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Adds a tenant environment, or replaces the one with the same name.
    pub async fn save_environment(&self, environment: &Environment) -> Result<(), SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        environments::upsert(environment, &mut conn).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl PaymentOrderStore for SqliteDatabase {
    async fn put(&self, order: &PaymentOrderRecord) -> Result<(), PaymentOrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        payment_orders::upsert(order, &mut conn).await?;
        Ok(())
    }

    async fn get(&self, transaction_id: &str) -> Result<PaymentOrderRecord, PaymentOrderStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        payment_orders::fetch_by_transaction_id(transaction_id, &mut conn)
            .await?
            .ok_or_else(|| PaymentOrderStoreError::NotFound(transaction_id.to_string()))
    }
}

impl EnvironmentStore for SqliteDatabase {
    async fn get(&self, tenant: &str) -> Result<Environment, EnvironmentStoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let environment = environments::fetch_by_name(tenant, &mut conn)
            .await?
            .ok_or_else(|| EnvironmentStoreError::NotFound(tenant.to_string()))?;
        if environment.epay_secret.is_empty() {
            warn!("🗃️ Environment '{tenant}' has no ePay secret configured");
            return Err(EnvironmentStoreError::NotConfigured(format!("Tenant '{tenant}' has no ePay secret")));
        }
        Ok(environment)
    }
}
