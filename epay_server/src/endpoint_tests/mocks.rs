use epay_engine::{db_types::Environment, EnvironmentStore, EnvironmentStoreError};
use mockall::mock;

mock! {
    pub Environments {}
    impl EnvironmentStore for Environments {
        async fn get(&self, tenant: &str) -> Result<Environment, EnvironmentStoreError>;
    }
}
