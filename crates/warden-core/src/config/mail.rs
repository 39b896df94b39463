//! Activation mail delivery configuration.

use serde::{Deserialize, Serialize};

/// How activation mail leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTransport {
    /// Write the activation link to the log (development).
    Log,
    /// POST the message to an HTTP endpoint.
    Webhook,
}

impl Default for MailTransport {
    fn default() -> Self {
        Self::Log
    }
}

impl std::fmt::Display for MailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailTransport::Log => write!(f, "log"),
            MailTransport::Webhook => write!(f, "webhook"),
        }
    }
}

/// Activation mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Selected transport.
    #[serde(default)]
    pub transport: MailTransport,
    /// Endpoint for the webhook transport.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Base URL the activation token is appended to.
    #[serde(default = "default_activation_url_base")]
    pub activation_url_base: String,
    /// Request timeout for the webhook transport, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::default(),
            webhook_url: None,
            activation_url_base: default_activation_url_base(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl MailConfig {
    /// Build the link a user follows to activate their account.
    pub fn activation_url(&self, token: &str) -> String {
        format!("{}/{}", self.activation_url_base.trim_end_matches('/'), token)
    }
}

fn default_activation_url_base() -> String {
    "http://localhost:8080/v1/auth/activation".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_url_trims_trailing_slash() {
        let config = MailConfig {
            activation_url_base: "https://sso.example.com/activate/".to_string(),
            ..MailConfig::default()
        };
        assert_eq!(
            config.activation_url("abc"),
            "https://sso.example.com/activate/abc"
        );
    }
}
