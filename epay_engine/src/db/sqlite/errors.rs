use thiserror::Error;

use crate::traits::{EnvironmentStoreError, PaymentOrderStoreError};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Database query error: {0}")]
    QueryError(String),
    #[error("Could not (de)serialize column data: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<SqliteDatabaseError> for PaymentOrderStoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<SqliteDatabaseError> for EnvironmentStoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
