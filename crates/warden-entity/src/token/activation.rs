//! Activation token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warden_core::types::id::{ActivationTokenId, UserId};

/// A one-time activation credential.
///
/// Rows are never deleted; a consumed token stays as an audit record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivationToken {
    /// Token value (also the primary key).
    pub id: ActivationTokenId,
    /// Account being activated.
    pub user_id: UserId,
    /// Set once, on activation.
    pub used: bool,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// `expires_at` compared against the lookup time by the store.
    pub valid: bool,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl ActivationToken {
    /// Whether the token may still be consumed at `now`.
    ///
    /// Checks the stored flags and the expiry independently of `valid`.
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.valid && self.expires_at > now
    }
}

/// Data required to insert an activation token.
#[derive(Debug, Clone)]
pub struct NewActivationToken {
    /// Token value.
    pub id: ActivationTokenId,
    /// Account being activated.
    pub user_id: UserId,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Issue time.
    pub created_at: DateTime<Utc>,
}
