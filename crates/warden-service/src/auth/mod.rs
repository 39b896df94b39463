//! Account lifecycle and authentication flows.

pub mod account;
pub mod otp;
pub mod request;
pub mod response;
pub mod service;

pub use request::{ChangePasswordRequest, LoginRequest, RegisterRequest};
pub use response::{LoginSteps, OtpEnrollment, Registration, SessionDescriptor};
pub use service::AuthService;
