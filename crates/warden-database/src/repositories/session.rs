//! Queries against `sessions`.

use tracing::Instrument;

use warden_core::result::AppResult;
use warden_core::types::id::SessionId;
use warden_entity::session::{NewSession, Session};

use super::{PgTx, db_error};

/// Insert a session.
pub async fn insert(tx: &mut PgTx<'_>, session: &NewSession) -> AppResult<SessionId> {
    let query = r"
        INSERT INTO sessions (id, user_id, ip_address, user_agent, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query_scalar::<_, SessionId>(query)
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .fetch_one(&mut **tx)
        .instrument(span)
        .await
        .map_err(db_error("Failed to create session"))
}

/// Find a session by id.
pub async fn find(tx: &mut PgTx<'_>, id: SessionId) -> AppResult<Option<Session>> {
    let query = "SELECT id, user_id, ip_address, user_agent, created_at FROM sessions WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    sqlx::query_as::<_, Session>(query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .map_err(db_error("Failed to find session"))
}

/// Delete a session. Deleting a missing row is fine.
pub async fn delete(tx: &mut PgTx<'_>, id: SessionId) -> AppResult<()> {
    let query = "DELETE FROM sessions WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .map_err(db_error("Failed to delete session"))?;
    Ok(())
}
