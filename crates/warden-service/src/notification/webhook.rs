//! Notifier that POSTs activation messages to an HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use warden_core::config::MailConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::ActivationNotifier;
use warden_core::types::id::ActivationTokenId;

const USER_AGENT: &str = concat!("warden/", env!("CARGO_PKG_VERSION"));

/// JSON body sent to the webhook.
#[derive(Debug, Serialize)]
struct ActivationPayload<'a> {
    to: &'a str,
    token: ActivationTokenId,
    activation_url: String,
}

/// Delivers activation mail through a webhook.
///
/// Any transport failure or non-2xx response is a `Notification` error.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    config: MailConfig,
}

impl WebhookNotifier {
    /// Creates a webhook notifier. Requires `mail.webhook_url`.
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        let endpoint = config
            .webhook_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                AppError::configuration("mail.webhook_url is required for the webhook transport")
            })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            endpoint,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ActivationNotifier for WebhookNotifier {
    async fn send_activation_email(&self, to: &str, token: ActivationTokenId) -> AppResult<()> {
        let payload = ActivationPayload {
            to,
            token,
            activation_url: self.config.activation_url(&token.to_string()),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Activation webhook unreachable");
                AppError::with_source(ErrorKind::Notification, "Activation webhook request failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Activation webhook rejected the message");
            return Err(AppError::notification(format!(
                "Activation webhook returned {status}"
            )));
        }

        debug!(status = %status, "Activation webhook accepted the message");
        Ok(())
    }
}
