//! Second-factor enrollment.
//!
//! Enrollment is two-phase. [`configure_otp`](AuthService::configure_otp)
//! stores a fresh secret and sets `OtpEnabled`; the factor is only
//! enforced at login once [`confirm_otp`](AuthService::confirm_otp) has
//! seen a valid code and set `OtpConfigured`.

use tracing::info;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::id::UserId;
use warden_database::{AccountStore, AccountTransaction, TxMode};
use warden_entity::user::{AccountState, Role, User};

use super::response::OtpEnrollment;
use super::service::{AuthService, observe, require_user};

impl<S: AccountStore> AuthService<S> {
    /// Generate and store a new secret. Replaces any previous enrollment.
    pub async fn configure_otp(&self, user_id: UserId) -> AppResult<OtpEnrollment> {
        observe("configure_otp", self.configure_otp_inner(user_id).await)
    }

    async fn configure_otp_inner(&self, user_id: UserId) -> AppResult<OtpEnrollment> {
        let now = self.clock.now();
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        let user = require_active(&mut tx, user_id).await?;

        let secret = self.otp.generate_secret()?;
        let provisioning_url = self.otp.provisioning_url(&secret, &user.email)?;
        let roles = user
            .roles
            .with(Role::OtpEnabled)
            .without(Role::OtpConfigured);

        tx.set_otp_secret(user.id, Some(&secret), now).await?;
        tx.update_roles(user.id, roles, now).await?;
        tx.commit().await?;

        info!(user_id = %user.id, "Second factor configured, awaiting confirmation");
        Ok(OtpEnrollment {
            provisioning_url,
            secret,
        })
    }

    /// Check a code against the pending secret and enforce the factor.
    pub async fn confirm_otp(&self, user_id: UserId, code: &str) -> AppResult<()> {
        observe("confirm_otp", self.confirm_otp_inner(user_id, code).await)
    }

    async fn confirm_otp_inner(&self, user_id: UserId, code: &str) -> AppResult<()> {
        let now = self.clock.now();
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        let user = require_active(&mut tx, user_id).await?;

        let secret = match (&user.otp_secret, user.roles.has(Role::OtpEnabled)) {
            (Some(secret), true) => secret.as_str(),
            _ => {
                return Err(AppError::permission_denied(
                    "Second factor has not been configured",
                ));
            }
        };
        if !self.otp.verify(secret, code, now)? {
            return Err(AppError::otp_token_invalid());
        }

        tx.update_roles(user.id, user.roles.with(Role::OtpConfigured), now)
            .await?;
        tx.commit().await?;

        info!(user_id = %user.id, "Second factor confirmed");
        Ok(())
    }

    /// The `otpauth://` URL for the stored secret.
    pub async fn otp_provisioning_url(&self, user_id: UserId) -> AppResult<String> {
        observe("otp_provisioning_url", self.provisioning_url_inner(user_id).await)
    }

    async fn provisioning_url_inner(&self, user_id: UserId) -> AppResult<String> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let user = require_user(&mut tx, user_id).await?;
        tx.rollback().await?;

        let secret = user
            .otp_secret
            .as_deref()
            .filter(|_| user.roles.has(Role::OtpEnabled))
            .ok_or_else(|| AppError::permission_denied("Second factor has not been configured"))?;
        self.otp.provisioning_url(secret, &user.email)
    }

    /// Remove the second factor and its secret.
    pub async fn disable_otp(&self, user_id: UserId) -> AppResult<()> {
        observe("disable_otp", self.disable_otp_inner(user_id).await)
    }

    async fn disable_otp_inner(&self, user_id: UserId) -> AppResult<()> {
        let now = self.clock.now();
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        let user = require_user(&mut tx, user_id).await?;

        let roles = user
            .roles
            .remove_roles([Role::OtpEnabled, Role::OtpConfigured]);
        tx.update_roles(user.id, roles, now).await?;
        tx.set_otp_secret(user.id, None, now).await?;
        tx.commit().await?;

        info!(user_id = %user.id, "Second factor removed");
        Ok(())
    }
}

async fn require_active<T: AccountTransaction>(tx: &mut T, user_id: UserId) -> AppResult<User> {
    let user = require_user(tx, user_id).await?;
    match user.state() {
        AccountState::Active => Ok(user),
        state => Err(AppError::permission_denied(format!(
            "Second factor requires an active account (account is {state})"
        ))),
    }
}
