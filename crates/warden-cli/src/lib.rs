//! # warden-cli
//!
//! Operator command line for Warden. Each command builds an
//! [`AuthService`](warden_service::AuthService) over PostgreSQL and makes
//! exactly one call on it.

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands};
pub use output::OutputFormat;
