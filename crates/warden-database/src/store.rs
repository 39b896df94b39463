//! Repository contracts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_core::result::AppResult;
use warden_core::types::id::{ActivationTokenId, SessionId, UserId};
use warden_entity::session::{NewSession, Session};
use warden_entity::token::{ActivationToken, NewActivationToken};
use warden_entity::user::{NewUser, RoleSet, User};

/// Access mode requested when a transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Reads and writes.
    ReadWrite,
    /// Reads only; any write fails.
    ReadOnly,
}

/// Source of account transactions.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Transaction handle produced by this store.
    type Tx: AccountTransaction;

    /// Open a transaction.
    async fn begin(&self, mode: TxMode) -> AppResult<Self::Tx>;
}

/// Every repository operation, scoped to one transaction.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// infrastructure failures. Dropping a handle without calling
/// [`commit`](AccountTransaction::commit) discards its writes.
#[async_trait]
pub trait AccountTransaction: Send {
    /// Find a user by normalized email.
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by id.
    async fn find_user_by_id(&mut self, id: UserId) -> AppResult<Option<User>>;

    /// Whether any user holds `email`.
    async fn user_exists_by_email(&mut self, email: &str) -> AppResult<bool>;

    /// Insert a user. A duplicate email yields `UserExists`.
    async fn insert_user(&mut self, user: &NewUser) -> AppResult<UserId>;

    /// Insert an activation token.
    async fn insert_activation_token(
        &mut self,
        token: &NewActivationToken,
    ) -> AppResult<ActivationTokenId>;

    /// Fetch a token with its `valid` flag computed against `now`.
    async fn get_activation_token(
        &mut self,
        id: ActivationTokenId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActivationToken>>;

    /// Flag a token as consumed.
    async fn mark_token_used(&mut self, id: ActivationTokenId) -> AppResult<()>;

    /// Replace a user's role set.
    async fn update_roles(
        &mut self,
        user_id: UserId,
        roles: RoleSet,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Add one to the failure counter and stamp `last_failure = at`.
    async fn increment_failed_attempts(&mut self, user_id: UserId, at: DateTime<Utc>)
    -> AppResult<()>;

    /// Zero the failure counter.
    async fn reset_failed_attempts(&mut self, user_id: UserId, now: DateTime<Utc>)
    -> AppResult<()>;

    /// Clear the active flag. No-op for an already disabled user.
    async fn disable_user(&mut self, user_id: UserId, now: DateTime<Utc>) -> AppResult<()>;

    /// Store or clear the TOTP secret.
    async fn set_otp_secret(
        &mut self,
        user_id: UserId,
        secret: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Replace the password hash and the key it was derived with.
    async fn update_password(
        &mut self,
        user_id: UserId,
        password_hash: &str,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Record a new session.
    async fn create_session(&mut self, session: &NewSession) -> AppResult<SessionId>;

    /// Find a session by id.
    async fn find_session(&mut self, id: SessionId) -> AppResult<Option<Session>>;

    /// Remove a session. Unknown ids are not an error.
    async fn delete_session(&mut self, id: SessionId) -> AppResult<()>;

    /// Make all writes durable.
    async fn commit(self) -> AppResult<()>;

    /// Discard all writes.
    async fn rollback(self) -> AppResult<()>;
}
