//! Activation mail delivery.
//!
//! Both notifiers implement [`ActivationNotifier`]; [`build_notifier`]
//! picks one from configuration.

pub mod log;
pub mod webhook;

use std::sync::Arc;

use warden_core::config::{MailConfig, MailTransport};
use warden_core::error::AppError;
use warden_core::traits::ActivationNotifier;

pub use self::log::LogNotifier;
pub use self::webhook::WebhookNotifier;

/// Build the notifier selected by `config.transport`.
pub fn build_notifier(config: &MailConfig) -> Result<Arc<dyn ActivationNotifier>, AppError> {
    match config.transport {
        MailTransport::Log => Ok(Arc::new(LogNotifier::new(config))),
        MailTransport::Webhook => Ok(Arc::new(WebhookNotifier::new(config)?)),
    }
}
