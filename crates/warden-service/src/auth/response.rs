//! Values returned by the authentication flows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::types::id::{SessionId, UserId};

/// Outcome of a successful registration.
///
/// The activation token itself only travels through the notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// New user's id.
    pub user_id: UserId,
    /// Normalized email the activation mail was sent to.
    pub email: String,
    /// When the activation token stops being accepted.
    pub activation_expires_at: DateTime<Utc>,
}

/// Bundle returned on successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Session identifier.
    pub session_id: SessionId,
    /// Signed session token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// Authenticated user.
    pub user_id: UserId,
    /// User email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role names.
    pub roles: Vec<String>,
    /// Session creation time.
    pub created_at: DateTime<Utc>,
}

/// Factors a login form must collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSteps {
    /// Always true.
    pub requires_password: bool,
    /// True when the account has a confirmed second factor.
    pub requires_otp: bool,
}

/// Second-factor enrollment material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpEnrollment {
    /// `otpauth://` URL to render as a QR code.
    pub provisioning_url: String,
    /// Base32 secret for manual entry.
    pub secret: String,
}
