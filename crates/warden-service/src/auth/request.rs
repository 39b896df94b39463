//! Inputs accepted by the authentication flows.

use serde::{Deserialize, Serialize};
use validator::Validate;

use warden_core::error::AppError;

/// Registration input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Given name.
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    /// Login email.
    #[validate(email(message = "Email is not valid"), length(max = 254))]
    pub email: String,
    /// Plaintext password; checked against the password policy separately.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Role names to grant instead of the registration default.
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// Login input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Client address as seen by the transport.
    #[serde(default)]
    pub client_ip: String,
    /// Client User-Agent.
    #[serde(default)]
    pub user_agent: String,
    /// One-time code, required when the account has a confirmed second factor.
    #[serde(default)]
    pub otp: Option<String>,
}

/// Password change input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// Replacement password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Run derive-based validation, mapping failures to `Validation` errors.
pub(crate) fn check<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid input: {e}")))
}

/// Trim and lowercase an email address.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
