//! Server configuration, read from environment variables.
//!
//! The deployment mode follows from `EPAY_TENANT_DATABASE_URL`. When it is set, every request is served for the
//! tenant named by its host and the billing system is picked per request. Otherwise the single tenant is configured
//! from process variables and `BILLING_SYSTEM` pins the back-end.
use std::{env, fmt::Display, str::FromStr, time::Duration};

use epay_billing::{telcong::DEFAULT_OAUTH_SCOPE, BillingSystem, ClientOptions, MetadataPolicy, DEFAULT_BILLING_TIMEOUT};
use epay_common::{parse_boolean_flag, parse_list};
use log::*;

use crate::errors::ServerError;

const DEFAULT_EPAY_HOST: &str = "0.0.0.0";
const DEFAULT_EPAY_PORT: u16 = 8080;
const DEFAULT_SQLITE_DB_PATH: &str = "/app/data/payment_orders.db";
const DEFAULT_SKIP_CHECK_IDNS: &str = "1111111111";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("'{other}' is not a log format. Use 'text' or 'json'.")),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl LogFormat {
    /// Reads `EPAY_LOG_FORMAT`. This runs before logging is set up, so invalid values silently fall back to text.
    pub fn from_env_or_default() -> Self {
        env::var("EPAY_LOG_FORMAT").ok().and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    /// One tenant, configured from process variables. Payment orders are only persisted when UCRM is the back-end.
    SingleTenant { billing_system: BillingSystem, sqlite_db_path: String },
    /// Tenants and payment orders live in the SQLite database at `database_url`.
    MultiTenant { database_url: String },
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub deployment: DeploymentMode,
    /// Apply the database migrations at start-up.
    pub run_migrations: bool,
    /// Applies to every call to a billing back-end.
    pub billing_timeout: Duration,
    pub metadata_policy: MetadataPolicy,
    pub oauth_scope: String,
    /// Probe IDNs. Bill checks for these are answered with "no bill due" before any checks are made.
    pub skip_check_idns: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_EPAY_HOST.to_string(),
            port: DEFAULT_EPAY_PORT,
            deployment: DeploymentMode::SingleTenant {
                billing_system: BillingSystem::TelcoNg,
                sqlite_db_path: DEFAULT_SQLITE_DB_PATH.to_string(),
            },
            run_migrations: true,
            billing_timeout: DEFAULT_BILLING_TIMEOUT,
            metadata_policy: MetadataPolicy::default(),
            oauth_scope: DEFAULT_OAUTH_SCOPE.to_string(),
            skip_check_idns: parse_list(DEFAULT_SKIP_CHECK_IDNS),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup function. An unknown billing system or metadata policy is a
    /// fatal error. Other malformed values are logged and replaced by their defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ServerError>
    where F: Fn(&str) -> Option<String> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let host = var("EPAY_HOST").unwrap_or_else(|| DEFAULT_EPAY_HOST.into());
        let port = var("PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for PORT. {e} Using the default, {DEFAULT_EPAY_PORT}, instead.");
                    DEFAULT_EPAY_PORT
                })
            })
            .unwrap_or(DEFAULT_EPAY_PORT);
        let billing_system = var("BILLING_SYSTEM")
            .map(|s| s.parse::<BillingSystem>())
            .transpose()
            .map_err(|e| ServerError::ConfigurationError(format!("BILLING_SYSTEM: {e}")))?;
        let deployment = match var("EPAY_TENANT_DATABASE_URL") {
            Some(database_url) => {
                if let Some(system) = billing_system {
                    warn!(
                        "🪛️ BILLING_SYSTEM={system} is ignored in multi-tenant mode. The billing system is chosen per \
                         request."
                    );
                }
                info!("🪛️ Multi-tenant mode. Tenants are read from {database_url}");
                DeploymentMode::MultiTenant { database_url }
            },
            None => {
                let billing_system = billing_system.unwrap_or_else(|| {
                    info!("🪛️ BILLING_SYSTEM is not set. Using telcong.");
                    BillingSystem::TelcoNg
                });
                let sqlite_db_path = var("SQLITE_DB_PATH").unwrap_or_else(|| DEFAULT_SQLITE_DB_PATH.into());
                DeploymentMode::SingleTenant { billing_system, sqlite_db_path }
            },
        };
        let metadata_policy = var("UCRM_METADATA_POLICY")
            .map(|s| s.parse::<MetadataPolicy>())
            .transpose()
            .map_err(|e| ServerError::ConfigurationError(format!("UCRM_METADATA_POLICY: {e}")))?
            .unwrap_or_default();
        let billing_timeout = var("EPAY_BILLING_TIMEOUT")
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for EPAY_BILLING_TIMEOUT. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_BILLING_TIMEOUT);
        let skip_check_idns =
            parse_list(&lookup("EPAY_SKIP_CHECK_IDNS").unwrap_or_else(|| DEFAULT_SKIP_CHECK_IDNS.into()));
        let log_format = var("EPAY_LOG_FORMAT")
            .and_then(|s| s.parse::<LogFormat>().map_err(|e| warn!("🪛️ EPAY_LOG_FORMAT: {e}")).ok())
            .unwrap_or_default();
        Ok(Self {
            host,
            port,
            deployment,
            run_migrations: parse_boolean_flag(var("EPAY_RUN_MIGRATIONS"), true),
            billing_timeout,
            metadata_policy,
            oauth_scope: var("TELCONG_OAUTH_SCOPE").unwrap_or_else(|| DEFAULT_OAUTH_SCOPE.into()),
            skip_check_idns,
            log_format,
        })
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.billing_timeout,
            metadata_policy: self.metadata_policy,
            oauth_scope: self.oauth_scope.clone(),
        }
    }
}
