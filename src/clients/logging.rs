use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::{
    clients::provider::MailProvider,
    error::ProviderError,
    models::message::{MailReceipt, RenderedMessage},
};

/// Writes messages to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LoggingMailer;

#[async_trait]
impl MailProvider for LoggingMailer {
    async fn send(&self, message: &RenderedMessage) -> Result<MailReceipt, ProviderError> {
        let message_id = format!("logged-{}", Uuid::new_v4());

        info!(
            message_id = %message_id,
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            text = %message.text,
            "Email not sent, logged by fallback provider"
        );

        Ok(MailReceipt::new(message_id))
    }

    fn name(&self) -> &'static str {
        "logging"
    }

    fn is_fallback(&self) -> bool {
        true
    }
}
