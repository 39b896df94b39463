//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use warden_auth::{OtpManager, PasswordHasher};
use warden_core::config::{AuthConfig, OtpConfig};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{ActivationNotifier, ManualClock};
use warden_core::types::id::{ActivationTokenId, UserId};
use warden_database::MemoryAccountStore;
use warden_service::{AuthService, LoginRequest, RegisterRequest, SessionDescriptor};

/// Password that satisfies the default policy.
pub const PASSWORD: &str = "correct-Horse-battery-staple-91";

/// A different password that also satisfies the policy.
pub const WRONG_PASSWORD: &str = "Unrelated-gravel-orchid-lantern-57";

/// Records every activation email instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, ActivationTokenId)>>,
}

impl RecordingNotifier {
    /// All recorded `(recipient, token)` pairs.
    pub fn sent(&self) -> Vec<(String, ActivationTokenId)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// The most recent token mailed to `email`.
    pub fn token_for(&self, email: &str) -> ActivationTokenId {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token)
            .expect("an activation email was recorded")
    }
}

#[async_trait]
impl ActivationNotifier for RecordingNotifier {
    async fn send_activation_email(&self, to: &str, token: ActivationTokenId) -> AppResult<()> {
        self.sent
            .lock()
            .expect("notifier lock")
            .push((to.to_string(), token));
        Ok(())
    }
}

/// Fails every delivery.
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl ActivationNotifier for FailingNotifier {
    async fn send_activation_email(&self, _to: &str, _token: ActivationTokenId) -> AppResult<()> {
        Err(AppError::notification("SMTP relay unavailable"))
    }
}

/// Test application context
pub struct TestApp {
    /// The service under test
    pub service: AuthService<MemoryAccountStore>,
    /// Handle on the same store the service writes to
    pub store: MemoryAccountStore,
    /// Handle on the service's clock
    pub clock: ManualClock,
    /// Captured activation emails
    pub notifier: Arc<RecordingNotifier>,
    /// OTP settings the service was built with
    pub otp: OtpManager,
}

impl TestApp {
    /// Create a new test application with a recording notifier.
    pub fn new() -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        Self::build(notifier.clone(), notifier)
    }

    /// Create a test application whose notifier always fails.
    pub fn with_failing_notifier() -> Self {
        Self::build(
            Arc::new(FailingNotifier),
            Arc::new(RecordingNotifier::default()),
        )
    }

    fn build(notifier: Arc<dyn ActivationNotifier>, recorder: Arc<RecordingNotifier>) -> Self {
        let store = MemoryAccountStore::new();
        let clock = ManualClock::new(start_time());
        let auth = AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            ..AuthConfig::default()
        };
        let otp_config = OtpConfig::default();

        let service = AuthService::new(
            store.clone(),
            notifier,
            Arc::new(clock.clone()),
            &auth,
            &otp_config,
        )
        .with_password_hasher(PasswordHasher::insecure_fast());

        Self {
            service,
            store,
            clock,
            notifier: recorder,
            otp: OtpManager::new(&otp_config),
        }
    }

    /// Registration input for `email` with the standard password.
    pub fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            roles: None,
        }
    }

    /// Login input without a one-time code.
    pub fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            client_ip: "203.0.113.7".to_string(),
            user_agent: "integration-test/1.0".to_string(),
            otp: None,
        }
    }

    /// Register `email` and return its id.
    pub async fn register(&self, email: &str) -> UserId {
        self.service
            .register(Self::register_request(email))
            .await
            .expect("registration succeeds")
            .user_id
    }

    /// Register and activate `email`.
    pub async fn register_active(&self, email: &str) -> UserId {
        let user_id = self.register(email).await;
        self.service
            .activate(self.notifier.token_for(email))
            .await
            .expect("activation succeeds");
        user_id
    }

    /// Log in with the given password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<SessionDescriptor> {
        self.service.login(Self::login_request(email, password)).await
    }
}

/// Fixed start instant for every test clock.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}
