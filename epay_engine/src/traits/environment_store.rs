use thiserror::Error;

use crate::db_types::Environment;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentStoreError {
    #[error("No environment is configured for tenant '{0}'")]
    NotFound(String),
    #[error("The environment is not fully configured. {0}")]
    NotConfigured(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Resolves the billing configuration of a tenant.
///
/// Single-tenant deployments ignore `tenant` altogether. Implementations either return a complete [`Environment`] or
/// an error; a partially filled environment is never a valid result.
#[allow(async_fn_in_trait)]
pub trait EnvironmentStore {
    async fn get(&self, tenant: &str) -> Result<Environment, EnvironmentStoreError>;
}
