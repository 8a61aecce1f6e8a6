use std::{path::Path, sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use epay_billing::{BillingSystem, ClientFactory};
use epay_engine::{EnvironmentStore, MemoryPaymentOrderStore, PaymentOrderStore, ProcessEnvironmentStore, SqliteDatabase};
use log::*;

use crate::{
    config::{DeploymentMode, ServerConfig},
    errors::ServerError,
    middleware::ChecksumMiddlewareFactory,
    routes::{health, PayConfirmRoute, PayInitRoute},
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let options = config.client_options();
    let srv = match config.deployment.clone() {
        DeploymentMode::MultiTenant { database_url } => {
            let db = open_database(&database_url, config.run_migrations).await?;
            info!(
                "🚀️ Environments and payment orders are stored in {database_url}. Billing systems are detected per \
                 request."
            );
            let factory = ClientFactory::new(db.clone()).with_options(options);
            create_server_instance(config, db, factory)?
        },
        DeploymentMode::SingleTenant { billing_system: BillingSystem::Ucrm, sqlite_db_path } => {
            let db = open_database(&sqlite_url(&sqlite_db_path)?, config.run_migrations).await?;
            info!("🚀️ Billing system: ucrm. Payment orders are stored in {sqlite_db_path}");
            let factory = ClientFactory::with_billing_system(db, BillingSystem::Ucrm).with_options(options);
            create_server_instance(config, ProcessEnvironmentStore::new(), factory)?
        },
        DeploymentMode::SingleTenant { billing_system: BillingSystem::TelcoNg, .. } => {
            info!("🚀️ Billing system: telcong. Payment orders are not persisted.");
            let factory = ClientFactory::with_billing_system(MemoryPaymentOrderStore::new(), BillingSystem::TelcoNg)
                .with_options(options);
            create_server_instance(config, ProcessEnvironmentStore::new(), factory)?
        },
    };
    srv.await.map_err(ServerError::from)
}

pub fn create_server_instance<E, S>(
    config: ServerConfig,
    environments: E,
    factory: ClientFactory<S>,
) -> Result<Server, ServerError>
where
    E: EnvironmentStore + Send + Sync + 'static,
    S: PaymentOrderStore + Send + 'static,
{
    let environments = Arc::new(environments);
    let skip_check_idns = config.skip_check_idns.clone();
    let srv = HttpServer::new(move || {
        let environments = Arc::clone(&environments);
        let skip_check_idns = skip_check_idns.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("epay::access_log"))
            .app_data(web::Data::new(factory.clone()))
            .service(health)
            .configure(move |cfg| configure_payment_routes::<E, S>(cfg, environments, skip_check_idns))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the `/v1/pay` routes behind the checksum middleware. The [`ClientFactory`] must be registered as app
/// data separately.
pub fn configure_payment_routes<E, S>(cfg: &mut web::ServiceConfig, environments: Arc<E>, skip_check_idns: Vec<String>)
where
    E: EnvironmentStore + 'static,
    S: PaymentOrderStore + 'static,
{
    cfg.service(
        web::scope("/v1/pay")
            .wrap(ChecksumMiddlewareFactory::new(environments, skip_check_idns))
            .service(PayInitRoute::<S>::new())
            .service(PayConfirmRoute::<S>::new()),
    );
}

async fn open_database(url: &str, run_migrations: bool) -> Result<SqliteDatabase, ServerError> {
    let db = SqliteDatabase::new_with_url(url, MAX_DB_CONNECTIONS).await?;
    if run_migrations {
        db.migrate().await?;
        info!("🚀️ Database migrations applied to {url}");
    }
    Ok(db)
}

/// Turns a database file path into a SQLite URL, creating the parent directory if needed.
fn sqlite_url(path: &str) -> Result<String, ServerError> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(format!("sqlite://{path}"))
}
