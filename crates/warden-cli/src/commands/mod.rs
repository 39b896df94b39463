//! CLI command definitions and dispatch.

pub mod account;
pub mod migrate;
pub mod otp;
pub mod session;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::i18n::MessageCatalog;
use warden_core::result::AppResult;
use warden_core::traits::SystemClock;
use warden_database::{DatabasePool, PgAccountStore};
use warden_service::{AuthService, build_notifier};

use crate::output::{self, OutputFormat};

/// Warden: account registration, activation and sessions
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Register a new account and send its activation email
    Register(account::RegisterArgs),
    /// Consume an activation token
    Activate(account::ActivateArgs),
    /// Disable an account
    DisableUser(account::UserArgs),
    /// Change an account's password
    ChangePassword(account::ChangePasswordArgs),
    /// Log in and print the session
    Login(session::LoginArgs),
    /// Delete a session
    Logout(session::LogoutArgs),
    /// Show which factors a login needs
    LoginSteps(session::LoginStepsArgs),
    /// Validate a session token and print its claims
    VerifyToken(session::VerifyTokenArgs),
    /// Second-factor management
    Otp(otp::OtpArgs),
}

/// Everything a command needs besides its own arguments.
pub struct Context<'a> {
    /// Loaded configuration
    pub config: &'a AppConfig,
    /// Selected output format
    pub format: OutputFormat,
    /// Message catalog for user-facing text
    pub catalog: &'a dyn MessageCatalog,
}

impl Context<'_> {
    /// Print the catalog text for `key` as a success line.
    pub fn success(&self, key: &str) {
        output::print_success(&self.catalog.lookup(key), self.format);
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig, catalog: &dyn MessageCatalog) -> AppResult<()> {
        let ctx = Context {
            config,
            format: self.format,
            catalog,
        };

        match &self.command {
            Commands::Migrate => migrate::execute(&ctx).await,
            Commands::Register(args) => account::register(args, &ctx).await,
            Commands::Activate(args) => account::activate(args, &ctx).await,
            Commands::DisableUser(args) => account::disable_user(args, &ctx).await,
            Commands::ChangePassword(args) => account::change_password(args, &ctx).await,
            Commands::Login(args) => session::login(args, &ctx).await,
            Commands::Logout(args) => session::logout(args, &ctx).await,
            Commands::LoginSteps(args) => session::login_steps(args, &ctx).await,
            Commands::VerifyToken(args) => session::verify_token(args, &ctx).await,
            Commands::Otp(args) => otp::execute(args, &ctx).await,
        }
    }
}

/// Helper: connect to the database from config
pub async fn connect(config: &AppConfig) -> AppResult<DatabasePool> {
    DatabasePool::connect(&config.database).await
}

/// Helper: build the orchestrator over PostgreSQL
pub async fn auth_service(config: &AppConfig) -> AppResult<AuthService<PgAccountStore>> {
    let pool = connect(config).await?;
    let notifier = build_notifier(&config.mail)?;
    Ok(AuthService::new(
        pool.account_store(),
        notifier,
        Arc::new(SystemClock),
        &config.auth,
        &config.otp,
    ))
}

/// Helper: take a password from the command line or prompt for it
pub fn password_or_prompt(
    given: Option<&str>,
    prompt: &str,
    confirm: bool,
) -> AppResult<String> {
    if let Some(password) = given {
        return Ok(password.to_string());
    }

    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_otp_confirm() {
        let cli = Cli::try_parse_from([
            "warden",
            "--format",
            "json",
            "otp",
            "confirm",
            "0191d2c4-5b7e-7c3a-9f10-3c2b1a0e9d8f",
            "123456",
        ])
        .expect("valid arguments");

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, "config/default.toml");
        assert!(matches!(cli.command, Commands::Otp(_)));
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(Cli::try_parse_from(["warden", "logout", "not-a-uuid"]).is_err());
    }
}
