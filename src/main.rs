//! Warden: identity and session management.
//!
//! Entry point that loads configuration, initialises logging and hands
//! the parsed command to `warden-cli`.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use warden_cli::Cli;
use warden_core::config::AppConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::i18n::{MessageCatalog, StaticCatalog};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&cli.config, &env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::debug!(config = %cli.config, env = %env, "Configuration loaded");

    let catalog = StaticCatalog::with_overrides(config.i18n.clone());
    if let Err(e) = cli.execute(&config, &catalog).await {
        warden_cli::output::print_error(e.kind.code(), &describe(&catalog, &e), cli.format);
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
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Catalog text for an error, with the detail for input problems.
fn describe(catalog: &dyn MessageCatalog, error: &AppError) -> String {
    let text = catalog.describe(error);
    match error.kind {
        ErrorKind::Validation | ErrorKind::PermissionDenied => {
            format!("{text}: {}", error.public_message())
        }
        _ => text,
    }
}
