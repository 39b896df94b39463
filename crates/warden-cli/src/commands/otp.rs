//! Second-factor commands.

use clap::{Args, Subcommand};

use warden_core::result::AppResult;
use warden_core::types::id::UserId;

use super::{Context, auth_service};
use crate::output;

/// Arguments for `otp`
#[derive(Debug, Args)]
pub struct OtpArgs {
    /// OTP subcommand
    #[command(subcommand)]
    pub command: OtpCommand,
}

/// OTP subcommands
#[derive(Debug, Subcommand)]
pub enum OtpCommand {
    /// Generate a secret and print its provisioning URL
    Configure {
        /// User ID
        user_id: UserId,
    },
    /// Confirm the secret with a code from the authenticator
    Confirm {
        /// User ID
        user_id: UserId,
        /// Six-digit code
        code: String,
    },
    /// Print the provisioning URL of the current secret
    Url {
        /// User ID
        user_id: UserId,
    },
    /// Remove the second factor
    Disable {
        /// User ID
        user_id: UserId,
    },
}

/// Execute OTP commands
pub async fn execute(args: &OtpArgs, ctx: &Context<'_>) -> AppResult<()> {
    let service = auth_service(ctx.config).await?;

    match &args.command {
        OtpCommand::Configure { user_id } => {
            let enrollment = service.configure_otp(*user_id).await?;
            ctx.success("success.otp_configure");
            output::print_record(&enrollment, ctx.format);
        }
        OtpCommand::Confirm { user_id, code } => {
            service.confirm_otp(*user_id, code).await?;
            ctx.success("success.otp_confirm");
        }
        OtpCommand::Url { user_id } => {
            let url = service.otp_provisioning_url(*user_id).await?;
            output::print_record(&serde_json::json!({ "provisioning_url": url }), ctx.format);
        }
        OtpCommand::Disable { user_id } => {
            service.disable_otp(*user_id).await?;
            ctx.success("success.otp_disable");
        }
    }

    Ok(())
}
