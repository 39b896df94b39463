//! User record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warden_core::types::id::UserId;

use super::role::RoleSet;
use super::state::AccountState;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Normalized (trimmed, lowercase) email address. Unique.
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Per-user secret mixed into the password hash.
    #[serde(skip_serializing)]
    pub token_key: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Capability bitmask.
    pub roles: RoleSet,
    /// Cleared only when the account is disabled.
    pub active: bool,
    /// Consecutive failed password checks.
    pub attempts: i32,
    /// Time of the most recent failed password check.
    pub last_failure: Option<DateTime<Utc>>,
    /// Base32 TOTP secret, present once second factor is enabled.
    #[serde(skip_serializing)]
    pub otp_secret: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Current lifecycle state.
    pub fn state(&self) -> AccountState {
        AccountState::derive(self.active, self.roles)
    }

    /// Whether login must present a one-time code.
    pub fn otp_required(&self) -> bool {
        self.roles.otp_required()
    }

    /// "First Last", trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Pre-generated identifier.
    pub id: UserId,
    /// Normalized email.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Secret mixed into the password hash.
    pub token_key: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Initial roles.
    pub roles: RoleSet,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Materialize the row as it looks right after insertion.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            token_key: self.token_key,
            first_name: self.first_name,
            last_name: self.last_name,
            roles: self.roles,
            active: true,
            attempts: 0,
            last_failure: None,
            otp_secret: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::role::Role;

    fn new_user() -> NewUser {
        NewUser {
            id: UserId::new(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            token_key: "a2V5".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            roles: RoleSet::registration_default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_user_starts_pending() {
        let user = new_user().into_user();
        assert_eq!(user.state(), AccountState::Pending);
        assert_eq!(user.attempts, 0);
        assert!(user.last_failure.is_none());
        assert!(!user.otp_required());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let mut user = new_user().into_user();
        user.otp_secret = Some("JBSWY3DPEHPK3PXP".to_string());
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("token_key").is_none());
        assert!(json.get("otp_secret").is_none());
        assert_eq!(json["roles"], serde_json::json!(["read_activation_token"]));
    }

    #[test]
    fn test_otp_required_follows_roles() {
        let mut user = new_user().into_user();
        user.roles = RoleSet::from_roles([Role::CreateSession, Role::OtpEnabled]);
        assert!(!user.otp_required());
        user.roles.add(Role::OtpConfigured);
        assert!(user.otp_required());
    }
}
