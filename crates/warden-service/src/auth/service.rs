//! Registration, activation, login and logout.

use std::sync::Arc;

use tracing::{error, info, warn};

use warden_auth::{
    ActivationTokenIssuer, Claims, JwtDecoder, JwtEncoder, LockoutPolicy, OtpManager,
    PasswordHasher, PasswordValidator,
};
use warden_core::config::{AuthConfig, OtpConfig};
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::{ActivationNotifier, Clock};
use warden_core::types::id::{ActivationTokenId, SessionId, UserId};
use warden_database::{AccountStore, AccountTransaction, TxMode};
use warden_entity::session::NewSession;
use warden_entity::user::{NewUser, Role, RoleSet, User};

use super::request::{LoginRequest, RegisterRequest, check, normalize_email};
use super::response::{LoginSteps, Registration, SessionDescriptor};

/// The authentication orchestrator.
///
/// Every public operation opens one transaction, and either commits it
/// or drops it. A dropped transaction rolls back, so an early return or a
/// cancelled future never leaves partial writes behind. The only
/// deliberate partial commit is the failed-attempt counter on a wrong
/// password.
pub struct AuthService<S: AccountStore> {
    pub(super) store: S,
    pub(super) notifier: Arc<dyn ActivationNotifier>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) hasher: PasswordHasher,
    pub(super) validator: PasswordValidator,
    pub(super) activation: ActivationTokenIssuer,
    pub(super) encoder: JwtEncoder,
    pub(super) decoder: JwtDecoder,
    pub(super) lockout: LockoutPolicy,
    pub(super) otp: OtpManager,
}

impl<S: AccountStore> std::fmt::Debug for AuthService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("activation", &self.activation)
            .field("lockout", &self.lockout)
            .field("otp", &self.otp)
            .finish()
    }
}

impl<S: AccountStore> AuthService<S> {
    /// Creates the service with all required dependencies.
    pub fn new(
        store: S,
        notifier: Arc<dyn ActivationNotifier>,
        clock: Arc<dyn Clock>,
        auth_config: &AuthConfig,
        otp_config: &OtpConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(auth_config),
            activation: ActivationTokenIssuer::new(auth_config),
            encoder: JwtEncoder::new(auth_config),
            decoder: JwtDecoder::new(auth_config),
            lockout: LockoutPolicy::new(auth_config),
            otp: OtpManager::new(otp_config),
        }
    }

    /// Replace the password hasher (e.g. cheaper Argon2 parameters).
    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// The store this service runs against.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a pending account and mail its activation token.
    ///
    /// The user row, the token row and the email are one unit: if the
    /// notifier fails, nothing is stored.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<Registration> {
        observe("register", self.register_inner(req).await)
    }

    async fn register_inner(&self, mut req: RegisterRequest) -> AppResult<Registration> {
        req.email = normalize_email(&req.email);
        req.first_name = req.first_name.trim().to_string();
        req.last_name = req.last_name.trim().to_string();
        check(&req)?;

        let RegisterRequest {
            first_name,
            last_name,
            email,
            ..
        } = req.clone();
        let roles = match &req.roles {
            Some(names) => RoleSet::from_names(names)?,
            None => RoleSet::registration_default(),
        };
        self.validator
            .validate(&req.password, &[email.as_str(), first_name.as_str(), last_name.as_str()])?;

        let token_key = self.hasher.generate_token_key();
        let password_hash = self.hasher.hash_password(&req.password, &token_key)?;
        let now = self.clock.now();

        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        if tx.user_exists_by_email(&email).await? {
            return Err(AppError::user_exists());
        }

        let user_id = tx
            .insert_user(&NewUser {
                id: UserId::new(),
                email: email.clone(),
                password_hash,
                token_key,
                first_name,
                last_name,
                roles,
                created_at: now,
            })
            .await?;

        let token = self.activation.issue(user_id, now);
        let token_id = tx.insert_activation_token(&token).await?;
        self.notifier.send_activation_email(&email, token_id).await?;
        tx.commit().await?;

        info!(user_id = %user_id, roles = %roles, "User registered");
        Ok(Registration {
            user_id,
            email,
            activation_expires_at: token.expires_at,
        })
    }

    /// Consume an activation token and grant session roles.
    ///
    /// The role change and the token consumption commit together or not
    /// at all.
    pub async fn activate(&self, token_id: ActivationTokenId) -> AppResult<()> {
        observe("activate", self.activate_inner(token_id).await)
    }

    async fn activate_inner(&self, token_id: ActivationTokenId) -> AppResult<()> {
        let now = self.clock.now();
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let token = tx
            .get_activation_token(token_id, now)
            .await?
            .filter(|t| t.is_consumable(now))
            .ok_or_else(AppError::token_not_valid)?;

        let user = tx
            .find_user_by_id(token.user_id)
            .await?
            .ok_or_else(AppError::token_not_valid)?;

        if !user.active {
            return Err(AppError::permission_denied("Account is disabled"));
        }
        if !user.roles.has(Role::ReadActivationToken) {
            return Err(AppError::permission_denied("Account is already activated"));
        }

        let roles = user
            .roles
            .remove_roles([Role::ReadActivationToken])
            .union(RoleSet::activation_grant());
        tx.update_roles(user.id, roles, now).await?;
        tx.mark_token_used(token.id).await?;
        tx.commit().await?;

        info!(user_id = %user.id, roles = %roles, "Account activated");
        Ok(())
    }

    /// Authenticate and open a session.
    pub async fn login(&self, req: LoginRequest) -> AppResult<SessionDescriptor> {
        observe("login", self.login_inner(req).await)
    }

    async fn login_inner(&self, req: LoginRequest) -> AppResult<SessionDescriptor> {
        check(&req)?;
        let email = normalize_email(&req.email);
        let now = self.clock.now();
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;

        let user = tx
            .find_user_by_email(&email)
            .await?
            .filter(|u| u.active)
            .ok_or_else(AppError::user_not_exists)?;

        if self.lockout.is_blocked(&user, now) {
            warn!(user_id = %user.id, attempts = user.attempts, "Login refused while blocked");
            return Err(AppError::user_blocked_temporarily());
        }

        if !self
            .hasher
            .verify_password(&req.password, &user.password_hash, &user.token_key)?
        {
            // The counter must survive the failed login.
            tx.increment_failed_attempts(user.id, now).await?;
            tx.commit().await?;
            warn!(user_id = %user.id, attempts = user.attempts + 1, "Wrong password");
            return Err(AppError::invalid_credentials());
        }

        if !user.roles.has(Role::CreateSession) {
            return Err(AppError::permission_denied("Account cannot open sessions"));
        }

        if user.otp_required() {
            self.check_login_otp(&user, req.otp.as_deref(), now)?;
        }

        let session_id = tx
            .create_session(&NewSession {
                id: SessionId::new(),
                user_id: user.id,
                ip_address: req.client_ip,
                user_agent: req.user_agent,
                created_at: now,
            })
            .await?;
        tx.reset_failed_attempts(user.id, now).await?;
        let (token, expires_at) = self.encoder.issue_session_token(&user, session_id, now)?;
        tx.commit().await?;

        info!(user_id = %user.id, session_id = %session_id, "Login successful");
        Ok(SessionDescriptor {
            session_id,
            token,
            expires_at,
            user_id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            roles: user.roles.names(),
            created_at: now,
        })
    }

    fn check_login_otp(
        &self,
        user: &User,
        code: Option<&str>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<()> {
        let (Some(secret), Some(code)) = (user.otp_secret.as_deref(), code) else {
            return Err(AppError::otp_token_invalid());
        };
        if !self.otp.verify(secret, code, now)? {
            warn!(user_id = %user.id, "One-time code rejected");
            return Err(AppError::otp_token_invalid());
        }
        Ok(())
    }

    /// Delete a session. Unknown ids succeed.
    pub async fn logout(&self, session_id: SessionId) -> AppResult<()> {
        observe("logout", self.logout_inner(session_id).await)
    }

    async fn logout_inner(&self, session_id: SessionId) -> AppResult<()> {
        let mut tx = self.store.begin(TxMode::ReadWrite).await?;
        tx.delete_session(session_id).await?;
        tx.commit().await?;
        info!(session_id = %session_id, "Logged out");
        Ok(())
    }

    /// Which factors the login form should ask for.
    ///
    /// Unknown and disabled emails get the same answer as a password-only
    /// account.
    pub async fn login_steps(&self, email: &str) -> AppResult<LoginSteps> {
        observe("login_steps", self.login_steps_inner(email).await)
    }

    async fn login_steps_inner(&self, email: &str) -> AppResult<LoginSteps> {
        let email = normalize_email(email);
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let requires_otp = tx
            .find_user_by_email(&email)
            .await?
            .filter(|u| u.active)
            .is_some_and(|u| u.otp_required());
        tx.rollback().await?;

        Ok(LoginSteps {
            requires_password: true,
            requires_otp,
        })
    }

    /// Validate a signed session token and return its claims.
    ///
    /// The session must still exist and its owner must still be active.
    pub async fn verify_session_token(&self, token: &str) -> AppResult<Claims> {
        observe("verify_session_token", self.verify_inner(token).await)
    }

    async fn verify_inner(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decoder.decode(token, self.clock.now())?;

        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let session = tx.find_session(claims.sid).await?;
        let user = tx.find_user_by_id(claims.sub).await?;
        tx.rollback().await?;

        match (session, user) {
            (Some(session), Some(user)) if session.user_id == user.id && user.active => Ok(claims),
            _ => Err(AppError::token_not_valid()),
        }
    }
}

/// Log a failed operation: refusals at warn, infrastructure at error.
pub(super) fn observe<T>(operation: &'static str, result: AppResult<T>) -> AppResult<T> {
    if let Err(err) = &result {
        if err.is_domain() {
            warn!(operation, code = err.kind.code(), "Request refused");
        } else {
            error!(operation, error = %err, "Request failed");
        }
    }
    result
}

/// Load a user by id or fail with `UserNotExists`.
pub(super) async fn require_user<T: AccountTransaction>(tx: &mut T, id: UserId) -> AppResult<User> {
    tx.find_user_by_id(id)
        .await?
        .ok_or_else(AppError::user_not_exists)
}
