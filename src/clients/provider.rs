//! Mail provider capability.
//!
//! The dispatcher only knows about [`MailProvider`]; concrete transports
//! (SMTP, Mailjet, the logging fallback) live next to this module and are
//! tied together by [`Mailer`](crate::clients::mailer::Mailer).

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::ProviderError,
    models::message::{MailReceipt, RenderedMessage},
};

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, message: &RenderedMessage) -> Result<MailReceipt, ProviderError>;

    /// Readiness probe. Providers without a cheap check report ready.
    async fn verify(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }

    fn name(&self) -> &'static str;

    /// True for providers that only pretend to deliver.
    fn is_fallback(&self) -> bool {
        false
    }
}

/// Builds the provider behind a [`SharedProvider`](crate::clients::shared::SharedProvider).
/// Called once per successful initialization.
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn MailProvider>, ProviderError>;
}
