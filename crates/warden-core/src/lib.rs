//! # warden-core
//!
//! Core crate for Warden. Contains configuration schemas, typed
//! identifiers, the clock and notification seams, the message catalog,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod i18n;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
