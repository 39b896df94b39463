//! Session commands.

use clap::Args;

use warden_core::result::AppResult;
use warden_core::types::id::SessionId;
use warden_service::LoginRequest;

use super::{Context, auth_service, password_or_prompt};
use crate::output;

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login email
    pub email: String,
    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
    /// One-time code, when the account has a second factor
    #[arg(long)]
    pub otp: Option<String>,
    /// Client address recorded on the session
    #[arg(long, default_value = "127.0.0.1")]
    pub client_ip: String,
    /// User agent recorded on the session
    #[arg(long, default_value = "warden-cli")]
    pub user_agent: String,
}

/// Arguments for `logout`
#[derive(Debug, Args)]
pub struct LogoutArgs {
    /// Session ID
    pub session_id: SessionId,
}

/// Arguments for `login-steps`
#[derive(Debug, Args)]
pub struct LoginStepsArgs {
    /// Login email
    pub email: String,
}

/// Arguments for `verify-token`
#[derive(Debug, Args)]
pub struct VerifyTokenArgs {
    /// Signed session token
    pub token: String,
}

/// Open a session.
pub async fn login(args: &LoginArgs, ctx: &Context<'_>) -> AppResult<()> {
    let password = password_or_prompt(args.password.as_deref(), "Password", false)?;
    let service = auth_service(ctx.config).await?;

    let session = service
        .login(LoginRequest {
            email: args.email.clone(),
            password,
            client_ip: args.client_ip.clone(),
            user_agent: args.user_agent.clone(),
            otp: args.otp.clone(),
        })
        .await?;

    ctx.success("success.login");
    output::print_record(&session, ctx.format);
    Ok(())
}

/// Delete a session.
pub async fn logout(args: &LogoutArgs, ctx: &Context<'_>) -> AppResult<()> {
    auth_service(ctx.config)
        .await?
        .logout(args.session_id)
        .await?;
    ctx.success("success.logout");
    Ok(())
}

/// Show the login factors for an email.
pub async fn login_steps(args: &LoginStepsArgs, ctx: &Context<'_>) -> AppResult<()> {
    let steps = auth_service(ctx.config)
        .await?
        .login_steps(&args.email)
        .await?;
    output::print_record(&steps, ctx.format);
    Ok(())
}

/// Print the claims of a valid session token.
pub async fn verify_token(args: &VerifyTokenArgs, ctx: &Context<'_>) -> AppResult<()> {
    let claims = auth_service(ctx.config)
        .await?
        .verify_session_token(args.token.trim())
        .await?;
    output::print_record(&claims, ctx.format);
    Ok(())
}
