//! Database migration command.

use tracing::info;

use warden_core::result::AppResult;

use super::Context;

/// Apply every pending migration.
pub async fn execute(ctx: &Context<'_>) -> AppResult<()> {
    let pool = super::connect(ctx.config).await?;
    info!("Running database migrations");
    pool.migrate().await?;
    pool.close().await;

    ctx.success("success.migrate");
    Ok(())
}
