//! Failed-login lockout window.
//!
//! A user is blocked while `attempts >= max_attempts` and the last failure
//! happened less than `window` ago. Nothing is written when the window
//! passes; the block simply stops applying.

use chrono::{DateTime, Duration, Utc};

use warden_core::config::AuthConfig;
use warden_entity::user::User;

/// Decides whether a user is temporarily blocked.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    max_attempts: i32,
    window: Duration,
}

impl LockoutPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            max_attempts: config.max_failed_attempts,
            window: Duration::minutes(config.lockout_duration_minutes as i64),
        }
    }

    /// Whether `user` is blocked at `now`.
    pub fn is_blocked(&self, user: &User, now: DateTime<Utc>) -> bool {
        self.blocked_until(user)
            .is_some_and(|until| now < until)
    }

    /// End of the current block window, if the threshold has been reached.
    pub fn blocked_until(&self, user: &User) -> Option<DateTime<Utc>> {
        if user.attempts < self.max_attempts {
            return None;
        }
        user.last_failure.map(|at| at + self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::types::id::UserId;
    use warden_entity::user::{NewUser, RoleSet};

    fn user(attempts: i32, last_failure: Option<DateTime<Utc>>) -> User {
        let mut user = NewUser {
            id: UserId::new(),
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            token_key: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            roles: RoleSet::activation_grant(),
            created_at: Utc::now(),
        }
        .into_user();
        user.attempts = attempts;
        user.last_failure = last_failure;
        user
    }

    #[test]
    fn test_below_threshold_is_never_blocked() {
        let policy = LockoutPolicy::new(&AuthConfig::default());
        let now = Utc::now();
        assert!(!policy.is_blocked(&user(2, Some(now)), now));
        assert!(!policy.is_blocked(&user(0, None), now));
    }

    #[test]
    fn test_at_threshold_within_window_is_blocked() {
        let policy = LockoutPolicy::new(&AuthConfig::default());
        let failed_at = Utc::now();
        let u = user(3, Some(failed_at));
        assert!(policy.is_blocked(&u, failed_at));
        assert!(policy.is_blocked(&u, failed_at + Duration::minutes(4)));
    }

    #[test]
    fn test_block_lifts_after_window() {
        let policy = LockoutPolicy::new(&AuthConfig::default());
        let failed_at = Utc::now();
        let u = user(7, Some(failed_at));
        assert!(!policy.is_blocked(&u, failed_at + Duration::minutes(5)));
        assert!(!policy.is_blocked(&u, failed_at + Duration::minutes(6)));
    }

    #[test]
    fn test_threshold_without_timestamp_is_not_blocked() {
        let policy = LockoutPolicy::new(&AuthConfig::default());
        assert!(!policy.is_blocked(&user(5, None), Utc::now()));
    }
}
