//! Second-factor (TOTP) configuration.

use serde::{Deserialize, Serialize};

/// TOTP parameters shared by enrollment and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Issuer label shown by authenticator apps.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Number of digits per code.
    #[serde(default = "default_digits")]
    pub digits: usize,
    /// Time step in seconds.
    #[serde(default = "default_step")]
    pub step_seconds: u64,
    /// Accepted steps of clock drift on either side.
    #[serde(default = "default_skew")]
    pub skew: u8,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            digits: default_digits(),
            step_seconds: default_step(),
            skew: default_skew(),
        }
    }
}

fn default_issuer() -> String {
    "Warden".to_string()
}

fn default_digits() -> usize {
    6
}

fn default_step() -> u64 {
    30
}

fn default_skew() -> u8 {
    1
}
