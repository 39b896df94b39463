//! Unified application error types for Warden.
//!
//! Every crate maps its internal failures into [`AppError`] so that the
//! orchestrator and the transport adapters see one error type. The
//! [`ErrorKind`] splits into two families:
//!
//! - **domain** kinds: rule violations (unknown user, blocked account,
//!   invalid token, ...). They carry a stable code and a human-readable
//!   message and are always safe to show to the caller.
//! - **infrastructure** kinds: opaque failures from the database, the
//!   notification gateway, or the token signer. They abort the enclosing
//!   transaction and are surfaced only as a generic failure.

use std::fmt;
use thiserror::Error;

/// Error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input was malformed or missing.
    Validation,
    /// An account with the given email already exists.
    UserExists,
    /// The account does not exist or is not active.
    UserNotExists,
    /// Email/password combination did not match.
    InvalidCredentials,
    /// The activation token is unknown, consumed, or expired.
    TokenNotValid,
    /// The account lacks the role bit required for the transition.
    PermissionDenied,
    /// Too many recent failed logins; the lockout window is active.
    UserBlockedTemporarily,
    /// The supplied one-time code did not verify.
    OtpTokenInvalid,
    /// A database error occurred.
    Database,
    /// The notification gateway failed.
    Notification,
    /// Signing or verifying a token failed.
    Signing,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind is a domain rule violation (as opposed to an
    /// infrastructure failure).
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::Validation
                | Self::UserExists
                | Self::UserNotExists
                | Self::InvalidCredentials
                | Self::TokenNotValid
                | Self::PermissionDenied
                | Self::UserBlockedTemporarily
                | Self::OtpTokenInvalid
        )
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::UserExists => "USER_EXISTS",
            Self::UserNotExists => "USER_NOT_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenNotValid => "TOKEN_NOT_VALID",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::UserBlockedTemporarily => "USER_BLOCKED_TEMPORARILY",
            Self::OtpTokenInvalid => "OTP_TOKEN_INVALID",
            Self::Database => "DATABASE",
            Self::Notification => "NOTIFICATION",
            Self::Signing => "SIGNING",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }

    /// Message catalog key for the localized description of this kind.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Validation => "errors.validation",
            Self::UserExists => "errors.user_exists",
            Self::UserNotExists => "errors.user_not_exists",
            Self::InvalidCredentials => "errors.email_or_password_not_valid",
            Self::TokenNotValid => "errors.token_not_valid",
            Self::PermissionDenied => "errors.permission_denied",
            Self::UserBlockedTemporarily => "errors.user_blocked_temporarily",
            Self::OtpTokenInvalid => "errors.otp_token_invalid",
            Self::Database
            | Self::Notification
            | Self::Signing
            | Self::Configuration
            | Self::Serialization
            | Self::Internal => "errors.internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout Warden.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// The email is already registered.
    pub fn user_exists() -> Self {
        Self::new(ErrorKind::UserExists, "User already exists")
    }

    /// The account is unknown or not active.
    pub fn user_not_exists() -> Self {
        Self::new(ErrorKind::UserNotExists, "User does not exist")
    }

    /// Email/password mismatch.
    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorKind::InvalidCredentials,
            "Email or password is not valid",
        )
    }

    /// The activation token cannot be used.
    pub fn token_not_valid() -> Self {
        Self::new(ErrorKind::TokenNotValid, "Token is not valid")
    }

    /// The account lacks the required role.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// The lockout window is active.
    pub fn user_blocked_temporarily() -> Self {
        Self::new(
            ErrorKind::UserBlockedTemporarily,
            "User is temporarily blocked",
        )
    }

    /// The one-time code did not verify.
    pub fn otp_token_invalid() -> Self {
        Self::new(ErrorKind::OtpTokenInvalid, "OTP token is invalid")
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a notification gateway error.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Notification, message)
    }

    /// Create a token signing error.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Signing, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is a domain rule violation.
    pub fn is_domain(&self) -> bool {
        self.kind.is_domain()
    }

    /// Message safe to return to an external caller.
    ///
    /// Infrastructure errors never expose their internal detail.
    pub fn public_message(&self) -> &str {
        if self.is_domain() {
            &self.message
        } else {
            "Internal server error"
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_split() {
        assert!(AppError::user_exists().is_domain());
        assert!(AppError::user_blocked_temporarily().is_domain());
        assert!(AppError::otp_token_invalid().is_domain());
        assert!(!AppError::database("connection reset").is_domain());
        assert!(!AppError::notification("smtp down").is_domain());
        assert!(!AppError::signing("bad key").is_domain());
    }

    #[test]
    fn test_public_message_hides_infrastructure_detail() {
        let err = AppError::database("relation \"users\" does not exist");
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::token_not_valid();
        assert_eq!(err.public_message(), "Token is not valid");
    }

    #[test]
    fn test_display_uses_stable_code() {
        let err = AppError::permission_denied("missing create_session");
        assert_eq!(err.to_string(), "PERMISSION_DENIED: missing create_session");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Internal, "wrapped", io);
        assert!(std::error::Error::source(&err).is_some());
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Internal);
        assert!(std::error::Error::source(&cloned).is_none());
    }
}
