//! Account lifecycle commands.

use clap::Args;

use warden_core::result::AppResult;
use warden_core::types::id::{ActivationTokenId, UserId};
use warden_service::{ChangePasswordRequest, RegisterRequest};

use super::{Context, auth_service, password_or_prompt};
use crate::output;

/// Arguments for `register`
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Login email
    pub email: String,
    /// Given name
    #[arg(long)]
    pub first_name: String,
    /// Family name
    #[arg(long)]
    pub last_name: String,
    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
    /// Comma-separated role names replacing the registration default
    #[arg(long, value_delimiter = ',')]
    pub roles: Option<Vec<String>>,
}

/// Arguments for `activate`
#[derive(Debug, Args)]
pub struct ActivateArgs {
    /// Activation token id from the email
    pub token: ActivationTokenId,
}

/// Arguments naming a single user
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User ID
    pub user_id: UserId,
}

/// Arguments for `change-password`
#[derive(Debug, Args)]
pub struct ChangePasswordArgs {
    /// User ID
    pub user_id: UserId,
    /// Current password (prompted when omitted)
    #[arg(long)]
    pub current_password: Option<String>,
    /// New password (prompted when omitted)
    #[arg(long)]
    pub new_password: Option<String>,
}

/// Register an account.
pub async fn register(args: &RegisterArgs, ctx: &Context<'_>) -> AppResult<()> {
    let password = password_or_prompt(args.password.as_deref(), "Password", true)?;
    let service = auth_service(ctx.config).await?;

    let registration = service
        .register(RegisterRequest {
            first_name: args.first_name.clone(),
            last_name: args.last_name.clone(),
            email: args.email.clone(),
            password,
            roles: args.roles.clone(),
        })
        .await?;

    ctx.success("success.register");
    output::print_record(&registration, ctx.format);
    Ok(())
}

/// Activate an account.
pub async fn activate(args: &ActivateArgs, ctx: &Context<'_>) -> AppResult<()> {
    auth_service(ctx.config).await?.activate(args.token).await?;
    ctx.success("success.activate");
    Ok(())
}

/// Disable an account.
pub async fn disable_user(args: &UserArgs, ctx: &Context<'_>) -> AppResult<()> {
    auth_service(ctx.config)
        .await?
        .disable_user(args.user_id)
        .await?;
    ctx.success("success.disable_user");
    Ok(())
}

/// Change a password.
pub async fn change_password(args: &ChangePasswordArgs, ctx: &Context<'_>) -> AppResult<()> {
    let current_password =
        password_or_prompt(args.current_password.as_deref(), "Current password", false)?;
    let new_password = password_or_prompt(args.new_password.as_deref(), "New password", true)?;

    auth_service(ctx.config)
        .await?
        .change_password(
            args.user_id,
            ChangePasswordRequest {
                current_password,
                new_password,
            },
        )
        .await?;
    ctx.success("success.change_password");
    Ok(())
}
