use dotenvy::dotenv;
use epay_server::{
    cli::handle_command_line_args,
    config::{LogFormat, ServerConfig},
    logging::init_logging,
    server::run_server,
};
use log::*;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    if handle_command_line_args() {
        return;
    }
    init_logging(LogFormat::from_env_or_default());
    let config = match ServerConfig::try_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("🚨️ {e}");
            std::process::exit(1);
        },
    };

    info!("🚀️ Starting server on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => info!("🚀️ Bye!"),
        Err(e) => {
            error!("🚨️ {e}");
            std::process::exit(1);
        },
    }
}
