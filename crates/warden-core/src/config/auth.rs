//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication, token, and lockout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for session token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// `iss` claim written into and required from session tokens.
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    /// Session token TTL in minutes.
    #[serde(default = "default_session_ttl")]
    pub session_token_ttl_minutes: u64,
    /// Activation token validity window in minutes.
    #[serde(default = "default_activation_ttl")]
    pub activation_token_ttl_minutes: u64,
    /// Failed login attempts that arm the lockout window.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i32,
    /// Lockout window in minutes, measured from the last failure.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn strength score (0-4).
    #[serde(default = "default_password_score")]
    pub password_min_score: u8,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_jwt_issuer(),
            session_token_ttl_minutes: default_session_ttl(),
            activation_token_ttl_minutes: default_activation_ttl(),
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: default_lockout(),
            password_min_length: default_password_min(),
            password_min_score: default_password_score(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_jwt_issuer() -> String {
    "warden".to_string()
}

fn default_session_ttl() -> u64 {
    60
}

fn default_activation_ttl() -> u64 {
    30
}

fn default_max_failed() -> i32 {
    3
}

fn default_lockout() -> u64 {
    5
}

fn default_password_min() -> usize {
    8
}

fn default_password_score() -> u8 {
    2
}
