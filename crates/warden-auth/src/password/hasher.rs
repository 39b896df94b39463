//! Argon2id password hashing keyed by a per-user secret.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString,
        rand_core::{OsRng, RngCore},
    },
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use warden_core::error::AppError;

/// Size of a generated token key, in bytes.
const TOKEN_KEY_BYTES: usize = 32;

/// Hashes and verifies passwords with Argon2id.
///
/// Every user carries a random "token key" that is fed to Argon2 as its
/// secret input, so a stored hash cannot be checked without the key stored
/// beside it.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher with the Argon2 default cost parameters.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    /// Cheapest parameters Argon2 accepts. For tests only.
    pub fn insecure_fast() -> Self {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
            .unwrap_or_default();
        Self::with_params(params)
    }

    /// Fresh random token key, base64 encoded.
    pub fn generate_token_key(&self) -> String {
        let mut key = [0u8; TOKEN_KEY_BYTES];
        OsRng.fill_bytes(&mut key);
        STANDARD.encode(key)
    }

    /// Hashes a plaintext password with a random salt and the given token key.
    pub fn hash_password(&self, password: &str, token_key: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2(token_key.as_bytes())?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash and token key.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(
        &self,
        password: &str,
        hash: &str,
        token_key: &str,
    ) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2(token_key.as_bytes())?.verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

impl PasswordHasher {
    fn argon2<'k>(&self, secret: &'k [u8]) -> Result<Argon2<'k>, AppError> {
        Argon2::new_with_secret(secret, Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .map_err(|e| AppError::internal(format!("Invalid password key: {e}")))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
