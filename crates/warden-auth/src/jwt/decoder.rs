//! Session token validation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

use super::claims::Claims;

/// Seconds of clock skew tolerated on `exp`.
const LEEWAY_SECONDS: i64 = 5;

/// Validates session tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `decode`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[config.jwt_issuer.as_str()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Checks signature, issuer, and expiry at `now`, returning the claims.
    ///
    /// Every failure maps to `TokenNotValid`.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Session token rejected");
                AppError::token_not_valid()
            })?
            .claims;

        if now.timestamp() - LEEWAY_SECONDS >= claims.exp {
            debug!(sid = %claims.sid, "Session token expired");
            return Err(AppError::token_not_valid());
        }

        Ok(claims)
    }
}
