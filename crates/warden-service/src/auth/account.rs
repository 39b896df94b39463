//! Account administration: disabling and password changes.

use tracing::info;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::id::UserId;
use warden_database::{AccountStore, AccountTransaction, TxMode};

use super::request::{ChangePasswordRequest, check};
use super::service::{AuthService, observe, require_user};

impl<S: AccountStore> AuthService<S> {
    /// Clear an account's active flag.
    ///
    /// Disabled accounts cannot log in or activate. Existing sessions are
    /// left in place, but [`verify_session_token`](Self::verify_session_token)
    /// stops accepting them.
    pub async fn disable_user(&self, user_id: UserId) -> AppResult<()> {
        observe("disable_user", self.disable_user_inner(user_id).await)
    }

    async fn disable_user_inner(&self, user_id: UserId) -> AppResult<()> {
        let now = self.clock.now();
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        let user = require_user(&mut tx, user_id).await?;
        tx.disable_user(user.id, now).await?;
        tx.commit().await?;

        info!(user_id = %user.id, "User disabled");
        Ok(())
    }

    /// Replace a password after checking the current one.
    ///
    /// A fresh per-user key is generated with the new hash.
    pub async fn change_password(&self, user_id: UserId, req: ChangePasswordRequest) -> AppResult<()> {
        observe("change_password", self.change_password_inner(user_id, req).await)
    }

    async fn change_password_inner(&self, user_id: UserId, req: ChangePasswordRequest) -> AppResult<()> {
        check(&req)?;
        let now = self.clock.now();
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let user = require_user(&mut tx, user_id).await?;
        if !user.active {
            return Err(AppError::user_not_exists());
        }
        if !self
            .hasher
            .verify_password(&req.current_password, &user.password_hash, &user.token_key)?
        {
            return Err(AppError::invalid_credentials());
        }

        self.validator
            .validate_not_same(&req.current_password, &req.new_password)?;
        self.validator.validate(
            &req.new_password,
            &[
                user.email.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
            ],
        )?;

        let token_key = self.hasher.generate_token_key();
        let password_hash = self.hasher.hash_password(&req.new_password, &token_key)?;
        tx.update_password(user.id, &password_hash, &token_key, now)
            .await?;
        tx.commit().await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}
