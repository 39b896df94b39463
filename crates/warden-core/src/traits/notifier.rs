//! Outbound activation notification.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::ActivationTokenId;

/// Delivers activation emails.
///
/// A failed delivery is reported as an error and aborts the registration
/// that triggered it.
#[async_trait]
pub trait ActivationNotifier: Send + Sync + 'static {
    /// Send the activation token to `to`.
    async fn send_activation_email(&self, to: &str, token: ActivationTokenId) -> AppResult<()>;
}
