//! erpgate server: allow-listed login proxy in front of an Odoo ERP.
//!
//! Main entry point that loads configuration, sets up logging and runs
//! the HTTP server.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use erpgate_core::config::AppConfig;

/// erpgate: allow-listed login proxy for Odoo
#[derive(Debug, Parser)]
#[command(name = "erpgate-server", version, about, long_about = None)]
struct Cli {
    /// Directory holding `default.toml` and per-environment overlays
    #[arg(short, long, env = "ERPGATE_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment overlay to apply on top of `default.toml`
    #[arg(short, long, env = "ERPGATE_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!(
        config_dir = %cli.config_dir,
        env = %cli.env,
        "Starting erpgate v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = erpgate_api::app::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
