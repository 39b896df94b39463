//! # warden-service
//!
//! The authentication orchestrator. [`AuthService`] drives registration,
//! activation, login, logout and the account maintenance flows; each call
//! runs inside exactly one store transaction.
//!
//! Services follow constructor injection: the store, notifier and clock
//! are provided at construction time.

pub mod auth;
pub mod notification;

pub use auth::{
    AuthService, ChangePasswordRequest, LoginRequest, LoginSteps, OtpEnrollment, RegisterRequest,
    Registration, SessionDescriptor,
};
pub use notification::{LogNotifier, WebhookNotifier, build_notifier};
