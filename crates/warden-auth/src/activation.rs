//! Activation token issuance.

use chrono::{DateTime, Duration, Utc};

use warden_core::config::AuthConfig;
use warden_core::types::id::{ActivationTokenId, UserId};
use warden_entity::token::NewActivationToken;

/// Mints activation tokens with a fixed validity window.
#[derive(Debug, Clone)]
pub struct ActivationTokenIssuer {
    ttl: Duration,
}

impl ActivationTokenIssuer {
    /// Creates an issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            ttl: Duration::minutes(config.activation_token_ttl_minutes as i64),
        }
    }

    /// Validity window of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A fresh token for `user_id`, expiring `ttl` after `now`.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> NewActivationToken {
        NewActivationToken {
            id: ActivationTokenId::new(),
            user_id,
            expires_at: now + self.ttl,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_thirty_minutes() {
        let issuer = ActivationTokenIssuer::new(&AuthConfig::default());
        let now = Utc::now();
        let token = issuer.issue(UserId::new(), now);
        assert_eq!(token.expires_at - now, Duration::minutes(30));
        assert_eq!(token.created_at, now);
    }

    #[test]
    fn test_window_follows_config() {
        let config = AuthConfig {
            activation_token_ttl_minutes: 90,
            ..AuthConfig::default()
        };
        let now = Utc::now();
        let token = ActivationTokenIssuer::new(&config).issue(UserId::new(), now);
        assert_eq!(token.expires_at, now + Duration::minutes(90));
    }

    #[test]
    fn test_ids_are_unique() {
        let issuer = ActivationTokenIssuer::new(&AuthConfig::default());
        let user = UserId::new();
        let now = Utc::now();
        assert_ne!(issuer.issue(user, now).id, issuer.issue(user, now).id);
    }
}
