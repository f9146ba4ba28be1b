use async_trait::async_trait;
use secrecy::ExposeSecret;

use warden_core::{Email, EmailClient};

/// Writes the message to the log instead of delivering it. The default
/// channel outside production.
#[derive(Debug, Clone, Default)]
pub struct LogEmailClient;

impl LogEmailClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailClient for LogEmailClient {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String> {
        tracing::info!(
            to = %recipient.as_ref().expose_secret(),
            subject,
            content,
            "message dispatched"
        );
        Ok(())
    }
}
