//! Queries against `users`.

use chrono::{DateTime, Utc};
use tracing::Instrument;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::id::UserId;
use warden_entity::user::{NewUser, RoleSet, User};

use super::{PgTx, db_error, is_unique_violation};

const USER_COLUMNS: &str = "id, email, password_hash, token_key, first_name, last_name, roles, \
     active, attempts, last_failure, otp_secret, created_at, updated_at";

fn span(operation: &'static str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// Find a user by email. `lock` takes a row lock for the rest of the transaction.
pub async fn find_by_email(tx: &mut PgTx<'_>, email: &str, lock: bool) -> AppResult<Option<User>> {
    let query = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1){}",
        if lock { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_optional(&mut **tx)
        .instrument(span("SELECT", &query))
        .await
        .map_err(db_error("Failed to find user by email"))
}

/// Find a user by primary key.
pub async fn find_by_id(tx: &mut PgTx<'_>, id: UserId, lock: bool) -> AppResult<Option<User>> {
    let query = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1{}",
        if lock { " FOR UPDATE" } else { "" }
    );
    sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .instrument(span("SELECT", &query))
        .await
        .map_err(db_error("Failed to find user by id"))
}

/// Whether an email is taken.
pub async fn exists_by_email(tx: &mut PgTx<'_>, email: &str) -> AppResult<bool> {
    let query = "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))";
    sqlx::query_scalar::<_, bool>(query)
        .bind(email)
        .fetch_one(&mut **tx)
        .instrument(span("SELECT", query))
        .await
        .map_err(db_error("Failed to check user existence"))
}

/// Insert a new user.
pub async fn insert(tx: &mut PgTx<'_>, user: &NewUser) -> AppResult<UserId> {
    let query = r"
        INSERT INTO users
            (id, email, password_hash, token_key, first_name, last_name, roles,
             active, attempts, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, 0, $8, $8)
        RETURNING id
    ";
    sqlx::query_scalar::<_, UserId>(query)
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.token_key)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.roles)
        .bind(user.created_at)
        .fetch_one(&mut **tx)
        .instrument(span("INSERT", query))
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::user_exists()
            } else {
                db_error("Failed to insert user")(e)
            }
        })
}

/// Overwrite the role bitmask.
pub async fn update_roles(
    tx: &mut PgTx<'_>,
    id: UserId,
    roles: RoleSet,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let query = "UPDATE users SET roles = $2, updated_at = $3 WHERE id = $1";
    sqlx::query(query)
        .bind(id)
        .bind(roles)
        .bind(now)
        .execute(&mut **tx)
        .instrument(span("UPDATE", query))
        .await
        .map_err(db_error("Failed to update user roles"))?;
    Ok(())
}

/// `attempts + 1` and stamp the failure time.
pub async fn increment_attempts(tx: &mut PgTx<'_>, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
    let query = "UPDATE users SET attempts = attempts + 1, last_failure = $2 WHERE id = $1";
    sqlx::query(query)
        .bind(id)
        .bind(at)
        .execute(&mut **tx)
        .instrument(span("UPDATE", query))
        .await
        .map_err(db_error("Failed to increment failed attempts"))?;
    Ok(())
}

/// Zero the failure counter.
pub async fn reset_attempts(tx: &mut PgTx<'_>, id: UserId, now: DateTime<Utc>) -> AppResult<()> {
    let query = "UPDATE users SET attempts = 0, updated_at = $2 WHERE id = $1 AND attempts <> 0";
    sqlx::query(query)
        .bind(id)
        .bind(now)
        .execute(&mut **tx)
        .instrument(span("UPDATE", query))
        .await
        .map_err(db_error("Failed to reset failed attempts"))?;
    Ok(())
}

/// Clear `active`; already disabled rows are left untouched.
pub async fn disable(tx: &mut PgTx<'_>, id: UserId, now: DateTime<Utc>) -> AppResult<()> {
    let query = "UPDATE users SET active = FALSE, updated_at = $2 WHERE id = $1 AND active = TRUE";
    sqlx::query(query)
        .bind(id)
        .bind(now)
        .execute(&mut **tx)
        .instrument(span("UPDATE", query))
        .await
        .map_err(db_error("Failed to disable user"))?;
    Ok(())
}

/// Store or clear the TOTP secret.
pub async fn set_otp_secret(
    tx: &mut PgTx<'_>,
    id: UserId,
    secret: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let query = "UPDATE users SET otp_secret = $2, updated_at = $3 WHERE id = $1";
    sqlx::query(query)
        .bind(id)
        .bind(secret)
        .bind(now)
        .execute(&mut **tx)
        .instrument(span("UPDATE", query))
        .await
        .map_err(db_error("Failed to update OTP secret"))?;
    Ok(())
}

/// Replace password material.
pub async fn update_password(
    tx: &mut PgTx<'_>,
    id: UserId,
    password_hash: &str,
    token_key: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let query =
        "UPDATE users SET password_hash = $2, token_key = $3, updated_at = $4 WHERE id = $1";
    sqlx::query(query)
        .bind(id)
        .bind(password_hash)
        .bind(token_key)
        .bind(now)
        .execute(&mut **tx)
        .instrument(span("UPDATE", query))
        .await
        .map_err(db_error("Failed to update password"))?;
    Ok(())
}
