//! In-memory account store.
//!
//! Used by tests and single-process development. A transaction holds the
//! store lock for its whole lifetime and mutates a private copy of the
//! state; `commit` publishes the copy, anything else throws it away.
//!
//! Because the lock spans every await inside a transaction, including the
//! activation email sent during registration, transactions run strictly one
//! at a time and a slow notifier stalls every other caller. Not meant for
//! production traffic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::id::{ActivationTokenId, SessionId, UserId};
use warden_entity::session::{NewSession, Session};
use warden_entity::token::{ActivationToken, NewActivationToken};
use warden_entity::user::{NewUser, RoleSet, User};

use crate::store::{AccountStore, AccountTransaction, TxMode};

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `insert_user`
    InsertUser,
    /// `insert_activation_token`
    InsertActivationToken,
    /// `mark_token_used`
    MarkTokenUsed,
    /// `update_roles`
    UpdateRoles,
    /// `increment_failed_attempts`
    IncrementFailedAttempts,
    /// `create_session`
    CreateSession,
    /// `commit`
    Commit,
}

#[derive(Debug, Clone, Default)]
struct State {
    users: HashMap<UserId, User>,
    tokens: HashMap<ActivationTokenId, ActivationToken>,
    sessions: HashMap<SessionId, Session>,
}

/// Account store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    state: Arc<Mutex<State>>,
    failures: Arc<std::sync::Mutex<Vec<FailPoint>>>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `point` fail with a database error.
    pub fn inject_failure(&self, point: FailPoint) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(point);
        }
    }

    /// Committed copy of a user, looked up by email.
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let email = email.to_lowercase();
        self.state
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned()
    }

    /// Committed activation tokens for a user, oldest first.
    pub async fn activation_tokens_for(&self, user_id: UserId) -> Vec<ActivationToken> {
        let mut tokens: Vec<_> = self
            .state
            .lock()
            .await
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        tokens
    }

    /// Committed sessions for a user.
    pub async fn sessions_for(&self, user_id: UserId) -> Vec<Session> {
        self.state
            .lock()
            .await
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Number of committed users.
    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    type Tx = MemoryAccountTransaction;

    async fn begin(&self, mode: TxMode) -> AppResult<Self::Tx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        debug!(?mode, "Memory transaction started");
        Ok(MemoryAccountTransaction {
            guard,
            working,
            mode,
            failures: Arc::clone(&self.failures),
        })
    }
}

/// An open in-memory transaction.
pub struct MemoryAccountTransaction {
    guard: OwnedMutexGuard<State>,
    working: State,
    mode: TxMode,
    failures: Arc<std::sync::Mutex<Vec<FailPoint>>>,
}

impl MemoryAccountTransaction {
    fn trip(&self, point: FailPoint) -> AppResult<()> {
        let Ok(mut failures) = self.failures.lock() else {
            return Ok(());
        };
        match failures.iter().position(|p| *p == point) {
            Some(index) => {
                failures.remove(index);
                Err(AppError::database(format!("Injected failure at {point:?}")))
            }
            None => Ok(()),
        }
    }

    fn writable(&self) -> AppResult<()> {
        match self.mode {
            TxMode::ReadWrite => Ok(()),
            TxMode::ReadOnly => Err(AppError::database(
                "Cannot execute write in a read-only transaction",
            )),
        }
    }

    fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.working.users.get_mut(&id)
    }
}

#[async_trait]
impl AccountTransaction for MemoryAccountTransaction {
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn find_user_by_id(&mut self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn user_exists_by_email(&mut self, email: &str) -> AppResult<bool> {
        Ok(self.find_user_by_email(email).await?.is_some())
    }

    async fn insert_user(&mut self, user: &NewUser) -> AppResult<UserId> {
        self.writable()?;
        self.trip(FailPoint::InsertUser)?;
        if self.user_exists_by_email(&user.email).await? {
            return Err(AppError::user_exists());
        }
        self.working.users.insert(user.id, user.clone().into_user());
        Ok(user.id)
    }

    async fn insert_activation_token(
        &mut self,
        token: &NewActivationToken,
    ) -> AppResult<ActivationTokenId> {
        self.writable()?;
        self.trip(FailPoint::InsertActivationToken)?;
        if !self.working.users.contains_key(&token.user_id) {
            return Err(AppError::database("Activation token references unknown user"));
        }
        self.working.tokens.insert(
            token.id,
            ActivationToken {
                id: token.id,
                user_id: token.user_id,
                used: false,
                expires_at: token.expires_at,
                valid: true,
                created_at: token.created_at,
            },
        );
        Ok(token.id)
    }

    async fn get_activation_token(
        &mut self,
        id: ActivationTokenId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActivationToken>> {
        Ok(self.working.tokens.get(&id).map(|t| ActivationToken {
            valid: t.expires_at > now,
            ..t.clone()
        }))
    }

    async fn mark_token_used(&mut self, id: ActivationTokenId) -> AppResult<()> {
        self.writable()?;
        self.trip(FailPoint::MarkTokenUsed)?;
        if let Some(token) = self.working.tokens.get_mut(&id) {
            token.used = true;
        }
        Ok(())
    }

    async fn update_roles(
        &mut self,
        user_id: UserId,
        roles: RoleSet,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.writable()?;
        self.trip(FailPoint::UpdateRoles)?;
        if let Some(user) = self.user_mut(user_id) {
            user.roles = roles;
            user.updated_at = now;
        }
        Ok(())
    }

    async fn increment_failed_attempts(
        &mut self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.writable()?;
        self.trip(FailPoint::IncrementFailedAttempts)?;
        if let Some(user) = self.user_mut(user_id) {
            user.attempts = user.attempts.saturating_add(1);
            user.last_failure = Some(at);
        }
        Ok(())
    }

    async fn reset_failed_attempts(
        &mut self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.writable()?;
        if let Some(user) = self.user_mut(user_id) {
            if user.attempts != 0 {
                user.attempts = 0;
                user.updated_at = now;
            }
        }
        Ok(())
    }

    async fn disable_user(&mut self, user_id: UserId, now: DateTime<Utc>) -> AppResult<()> {
        self.writable()?;
        if let Some(user) = self.user_mut(user_id) {
            if user.active {
                user.active = false;
                user.updated_at = now;
            }
        }
        Ok(())
    }

    async fn set_otp_secret(
        &mut self,
        user_id: UserId,
        secret: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.writable()?;
        if let Some(user) = self.user_mut(user_id) {
            user.otp_secret = secret.map(str::to_string);
            user.updated_at = now;
        }
        Ok(())
    }

    async fn update_password(
        &mut self,
        user_id: UserId,
        password_hash: &str,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.writable()?;
        if let Some(user) = self.user_mut(user_id) {
            user.password_hash = password_hash.to_string();
            user.token_key = token_key.to_string();
            user.updated_at = now;
        }
        Ok(())
    }

    async fn create_session(&mut self, session: &NewSession) -> AppResult<SessionId> {
        self.writable()?;
        self.trip(FailPoint::CreateSession)?;
        self.working
            .sessions
            .insert(session.id, session.clone().into_session());
        Ok(session.id)
    }

    async fn find_session(&mut self, id: SessionId) -> AppResult<Option<Session>> {
        Ok(self.working.sessions.get(&id).cloned())
    }

    async fn delete_session(&mut self, id: SessionId) -> AppResult<()> {
        self.writable()?;
        self.working.sessions.remove(&id);
        Ok(())
    }

    async fn commit(mut self) -> AppResult<()> {
        self.trip(FailPoint::Commit)?;
        *self.guard = std::mem::take(&mut self.working);
        debug!("Memory transaction committed");
        Ok(())
    }

    async fn rollback(self) -> AppResult<()> {
        debug!("Memory transaction rolled back");
        Ok(())
    }
}
