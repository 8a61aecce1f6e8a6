use std::{env, env::VarError};

/// There's no real CLI for the server. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets and key material are deliberately missing from this list
    const DISPLAY_ENVS: [&str; 19] = [
        "RUST_LOG",
        "EPAY_LOG_FORMAT",
        "EPAY_HOST",
        "PORT",
        "BILLING_SYSTEM",
        "EPAY_TENANT_DATABASE_URL",
        "SQLITE_DB_PATH",
        "EPAY_RUN_MIGRATIONS",
        "EPAY_BILLING_TIMEOUT",
        "EPAY_SKIP_CHECK_IDNS",
        "UCRM_METADATA_POLICY",
        "TELCONG_OAUTH_SCOPE",
        "TELCONG_BILLING_URL",
        "EPAY_MERCHANT_ID",
        "UCRM_BILLING_URL",
        "UCRM_METHOD_ID",
        "UCRM_PROVIDER_NAME",
        "UCRM_PROVIDER_PAYMENT_ID",
        "UCRM_ORGANIZATION_ID",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
