//! Queries against `activation_tokens`.

use chrono::{DateTime, Utc};
use tracing::Instrument;

use warden_core::result::AppResult;
use warden_core::types::id::ActivationTokenId;
use warden_entity::token::{ActivationToken, NewActivationToken};

use super::{PgTx, db_error};

/// Insert a token.
pub async fn insert(tx: &mut PgTx<'_>, token: &NewActivationToken) -> AppResult<ActivationTokenId> {
    let query = r"
        INSERT INTO activation_tokens (id, user_id, used, expires_at, created_at)
        VALUES ($1, $2, FALSE, $3, $4)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query_scalar::<_, ActivationTokenId>(query)
        .bind(token.id)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&mut **tx)
        .instrument(span)
        .await
        .map_err(db_error("Failed to insert activation token"))
}

/// Look a token up; `valid` is `expires_at > now`.
pub async fn find(
    tx: &mut PgTx<'_>,
    id: ActivationTokenId,
    now: DateTime<Utc>,
) -> AppResult<Option<ActivationToken>> {
    let query = r"
        SELECT id, user_id, used, expires_at, expires_at > $2 AS valid, created_at
        FROM activation_tokens
        WHERE id = $1
        FOR UPDATE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, ActivationToken>(query)
        .bind(id)
        .bind(now)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .map_err(db_error("Failed to find activation token"))
}

/// Flag a token as consumed.
pub async fn mark_used(tx: &mut PgTx<'_>, id: ActivationTokenId) -> AppResult<()> {
    let query = "UPDATE activation_tokens SET used = TRUE WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .map_err(db_error("Failed to mark activation token used"))?;
    Ok(())
}
