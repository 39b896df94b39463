//! Development notifier that writes the activation link to the log.

use async_trait::async_trait;
use tracing::{debug, info};

use warden_core::config::MailConfig;
use warden_core::result::AppResult;
use warden_core::traits::ActivationNotifier;
use warden_core::types::id::ActivationTokenId;

/// Logs activation links instead of sending mail. Never fails.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    config: MailConfig,
}

impl LogNotifier {
    /// Creates a log notifier.
    pub fn new(config: &MailConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl ActivationNotifier for LogNotifier {
    async fn send_activation_email(&self, to: &str, token: ActivationTokenId) -> AppResult<()> {
        // Link is a live credential: debug only.
        info!(to = %to, "Activation email (log transport)");
        debug!(
            to = %to,
            activation_url = %self.config.activation_url(&token.to_string()),
            "Activation link"
        );
        Ok(())
    }
}
