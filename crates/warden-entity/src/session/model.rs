//! Session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warden_core::types::id::{SessionId, UserId};

/// An authenticated login.
///
/// Created on login and deleted on logout. There is no stored expiry; the
/// signed session token carries its own.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// The user this session belongs to.
    pub user_id: UserId,
    /// Client address as reported by the transport.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// Login time.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Pre-generated identifier.
    pub id: SessionId,
    /// The user this session belongs to.
    pub user_id: UserId,
    /// Client address.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// Login time.
    pub created_at: DateTime<Utc>,
}

impl NewSession {
    /// Materialize the row as it looks right after insertion.
    pub fn into_session(self) -> Session {
        Session {
            id: self.id,
            user_id: self.user_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        }
    }
}
