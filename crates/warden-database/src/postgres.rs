//! PostgreSQL account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::id::{ActivationTokenId, SessionId, UserId};
use warden_entity::session::{NewSession, Session};
use warden_entity::token::{ActivationToken, NewActivationToken};
use warden_entity::user::{NewUser, RoleSet, User};

use crate::connection::DatabasePool;
use crate::repositories::{activation_token, session, user};
use crate::store::{AccountStore, AccountTransaction, TxMode};

/// Account store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<&DatabasePool> for PgAccountStore {
    fn from(db: &DatabasePool) -> Self {
        Self::new(db.pool().clone())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    type Tx = PgAccountTransaction;

    async fn begin(&self, mode: TxMode) -> AppResult<Self::Tx> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        if mode == TxMode::ReadOnly {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to set read-only mode", e)
                })?;
        }

        Ok(PgAccountTransaction { tx, mode })
    }
}

/// An open PostgreSQL transaction.
///
/// sqlx rolls the transaction back when it is dropped uncommitted, which
/// covers early returns and cancelled futures.
pub struct PgAccountTransaction {
    tx: Transaction<'static, Postgres>,
    mode: TxMode,
}

impl PgAccountTransaction {
    fn locks(&self) -> bool {
        self.mode == TxMode::ReadWrite
    }
}

#[async_trait]
impl AccountTransaction for PgAccountTransaction {
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        let lock = self.locks();
        user::find_by_email(&mut self.tx, email, lock).await
    }

    async fn find_user_by_id(&mut self, id: UserId) -> AppResult<Option<User>> {
        let lock = self.locks();
        user::find_by_id(&mut self.tx, id, lock).await
    }

    async fn user_exists_by_email(&mut self, email: &str) -> AppResult<bool> {
        user::exists_by_email(&mut self.tx, email).await
    }

    async fn insert_user(&mut self, new_user: &NewUser) -> AppResult<UserId> {
        user::insert(&mut self.tx, new_user).await
    }

    async fn insert_activation_token(
        &mut self,
        token: &NewActivationToken,
    ) -> AppResult<ActivationTokenId> {
        activation_token::insert(&mut self.tx, token).await
    }

    async fn get_activation_token(
        &mut self,
        id: ActivationTokenId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActivationToken>> {
        activation_token::find(&mut self.tx, id, now).await
    }

    async fn mark_token_used(&mut self, id: ActivationTokenId) -> AppResult<()> {
        activation_token::mark_used(&mut self.tx, id).await
    }

    async fn update_roles(
        &mut self,
        user_id: UserId,
        roles: RoleSet,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        user::update_roles(&mut self.tx, user_id, roles, now).await
    }

    async fn increment_failed_attempts(
        &mut self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        user::increment_attempts(&mut self.tx, user_id, at).await
    }

    async fn reset_failed_attempts(
        &mut self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        user::reset_attempts(&mut self.tx, user_id, now).await
    }

    async fn disable_user(&mut self, user_id: UserId, now: DateTime<Utc>) -> AppResult<()> {
        user::disable(&mut self.tx, user_id, now).await
    }

    async fn set_otp_secret(
        &mut self,
        user_id: UserId,
        secret: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        user::set_otp_secret(&mut self.tx, user_id, secret, now).await
    }

    async fn update_password(
        &mut self,
        user_id: UserId,
        password_hash: &str,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        user::update_password(&mut self.tx, user_id, password_hash, token_key, now).await
    }

    async fn create_session(&mut self, new_session: &NewSession) -> AppResult<SessionId> {
        session::insert(&mut self.tx, new_session).await
    }

    async fn find_session(&mut self, id: SessionId) -> AppResult<Option<Session>> {
        session::find(&mut self.tx, id).await
    }

    async fn delete_session(&mut self, id: SessionId) -> AppResult<()> {
        session::delete(&mut self.tx, id).await
    }

    async fn commit(self) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
    }

    async fn rollback(self) -> AppResult<()> {
        self.tx.rollback().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to roll back transaction", e)
        })
    }
}
