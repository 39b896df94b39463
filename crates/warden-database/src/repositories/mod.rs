//! SQL for each table, executed on a caller-owned transaction.

pub mod activation_token;
pub mod session;
pub mod user;

use warden_core::error::{AppError, ErrorKind};

type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;

/// Wrap a sqlx failure as a database error with context.
fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Whether a query failed on a unique constraint.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
