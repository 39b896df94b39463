//! # warden-auth
//!
//! Credential primitives used by the authentication flows.
//!
//! ## Modules
//!
//! - `activation`: activation token issuance (random id + expiry)
//! - `jwt`: signed session tokens
//! - `lockout`: failed-login lockout window
//! - `otp`: TOTP secrets, provisioning URLs, and code checks
//! - `password`: Argon2id hashing keyed per user, and password policy

pub mod activation;
pub mod jwt;
pub mod lockout;
pub mod otp;
pub mod password;

pub use activation::ActivationTokenIssuer;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use lockout::LockoutPolicy;
pub use otp::OtpManager;
pub use password::{PasswordHasher, PasswordValidator};
