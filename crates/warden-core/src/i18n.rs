//! Human-readable text for error and success keys.
//!
//! The core only ever hands out message keys; adapters turn them into text
//! through a [`MessageCatalog`].

use std::collections::HashMap;

use crate::error::AppError;

/// Resolves message keys to localized text.
pub trait MessageCatalog: Send + Sync + 'static {
    /// Text for `key`. Unknown keys are returned unchanged.
    fn lookup(&self, key: &str) -> String;

    /// Text for an error, keyed by its kind.
    fn describe(&self, error: &AppError) -> String {
        self.lookup(error.kind.message_key())
    }
}

const DEFAULTS: &[(&str, &str)] = &[
    ("errors.validation", "The submitted data is not valid"),
    ("errors.user_exists", "A user with this email already exists"),
    ("errors.user_not_exists", "User does not exist"),
    ("errors.email_or_password_not_valid", "Email or password is not valid"),
    ("errors.token_not_valid", "Token is not valid"),
    ("errors.permission_denied", "Permission denied"),
    (
        "errors.user_blocked_temporarily",
        "Too many failed attempts, the account is blocked temporarily",
    ),
    ("errors.otp_token_invalid", "One-time code is not valid"),
    ("errors.internal", "Internal server error"),
    ("success.register", "Registration complete, check your inbox"),
    ("success.activate", "Account activated"),
    ("success.login", "Logged in"),
    ("success.logout", "Logged out"),
    ("success.disable_user", "User disabled"),
    ("success.otp_configure", "Scan the code with an authenticator app"),
    ("success.otp_confirm", "Two-factor authentication enabled"),
    ("success.otp_disable", "Two-factor authentication disabled"),
    ("success.change_password", "Password changed"),
    ("success.migrate", "All migrations applied"),
];

/// English catalog with optional per-key overrides.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    messages: HashMap<String, String>,
}

impl StaticCatalog {
    /// Catalog holding only the built-in English text.
    pub fn new() -> Self {
        Self::with_overrides(HashMap::new())
    }

    /// Built-in text, with `overrides` taking precedence.
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        let mut messages: HashMap<String, String> = DEFAULTS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        messages.extend(overrides);
        Self { messages }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCatalog for StaticCatalog {
    fn lookup(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
