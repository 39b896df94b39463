//! Time-based one-time passwords (RFC 6238).

use chrono::{DateTime, Utc};
use totp_rs::{Algorithm, Secret, TOTP};

use warden_core::config::OtpConfig;
use warden_core::error::AppError;

/// Generates TOTP secrets and checks codes against them.
#[derive(Debug, Clone)]
pub struct OtpManager {
    issuer: String,
    digits: usize,
    skew: u8,
    step: u64,
}

impl OtpManager {
    /// Creates a manager from OTP configuration.
    pub fn new(config: &OtpConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            digits: config.digits,
            skew: config.skew,
            step: config.step_seconds,
        }
    }

    /// A new random secret, base32 encoded.
    pub fn generate_secret(&self) -> Result<String, AppError> {
        let bytes = Secret::generate_secret()
            .to_bytes()
            .map_err(|e| AppError::internal(format!("OTP secret generation failed: {e:?}")))?;
        Ok(self.build(bytes, "generate")?.get_secret_base32())
    }

    /// `otpauth://` URL for authenticator apps.
    pub fn provisioning_url(&self, secret: &str, account: &str) -> Result<String, AppError> {
        Ok(self.totp(secret, account)?.get_url())
    }

    /// Whether `code` is valid for `secret` at `now`, allowing the configured skew.
    pub fn verify(&self, secret: &str, code: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let code = code.trim();
        if code.len() != self.digits || !code.chars().all(|c| c.is_ascii_digit()) {
            return Ok(false);
        }
        Ok(self.totp(secret, "verify")?.check(code, unix_seconds(now)))
    }

    /// The code valid at `now`.
    pub fn code_at(&self, secret: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        Ok(self.totp(secret, "generate")?.generate(unix_seconds(now)))
    }

    fn totp(&self, secret: &str, account: &str) -> Result<TOTP, AppError> {
        let bytes = Secret::Encoded(secret.to_string())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Stored OTP secret is not valid base32: {e:?}")))?;
        self.build(bytes, account)
    }

    fn build(&self, bytes: Vec<u8>, account: &str) -> Result<TOTP, AppError> {
        TOTP::new(
            Algorithm::SHA1,
            self.digits,
            self.skew,
            self.step,
            bytes,
            Some(self.issuer.clone()),
            account.to_string(),
        )
        .map_err(|e| AppError::internal(format!("TOTP init error: {e}")))
    }
}

fn unix_seconds(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn manager() -> OtpManager {
        OtpManager::new(&OtpConfig::default())
    }

    #[test]
    fn test_current_code_verifies() {
        let otp = manager();
        let secret = otp.generate_secret().expect("secret");
        let now = Utc::now();
        let code = otp.code_at(&secret, now).expect("code");

        assert_eq!(code.len(), 6);
        assert!(otp.verify(&secret, &code, now).expect("verify"));
    }

    #[test]
    fn test_skew_allows_one_step_either_side() {
        let otp = manager();
        let secret = otp.generate_secret().expect("secret");
        let now = Utc::now();
        let code = otp.code_at(&secret, now).expect("code");

        assert!(otp.verify(&secret, &code, now + Duration::seconds(30)).expect("verify"));
        assert!(!otp.verify(&secret, &code, now + Duration::minutes(5)).expect("verify"));
    }

    #[test]
    fn test_malformed_code_is_rejected_without_error() {
        let otp = manager();
        let secret = otp.generate_secret().expect("secret");
        assert!(!otp.verify(&secret, "12ab56", Utc::now()).expect("verify"));
        assert!(!otp.verify(&secret, "1234567", Utc::now()).expect("verify"));
    }

    #[test]
    fn test_provisioning_url_names_issuer_and_account() {
        let otp = manager();
        let secret = otp.generate_secret().expect("secret");
        let url = otp.provisioning_url(&secret, "a@x.com").expect("url");
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains("issuer=Warden"));
        assert!(url.contains(&format!("secret={secret}")));
    }

    #[test]
    fn test_corrupt_secret_is_an_error() {
        assert!(manager().verify("not base32!", "123456", Utc::now()).is_err());
    }
}
