//! Claims carried by a signed session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_core::types::id::{SessionId, UserId};
use warden_entity::user::RoleSet;

/// JWT claims payload embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID.
    pub sub: UserId,
    /// Session ID this token belongs to.
    pub sid: SessionId,
    /// Email at the time of issuance.
    pub email: String,
    /// Role names at the time of issuance.
    pub roles: Vec<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns the session ID.
    pub fn session_id(&self) -> SessionId {
        self.sid
    }

    /// Role names parsed back into a set. Unknown names are dropped.
    pub fn role_set(&self) -> RoleSet {
        RoleSet::from_roles(self.roles.iter().filter_map(|name| name.parse().ok()))
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Whether the token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
