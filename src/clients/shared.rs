use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::{
    clients::provider::{MailProvider, ProviderConnector},
    error::NotificationError,
};

/// Process-wide mail provider, initialized at most once.
///
/// Concurrent first callers wait on the same initialization. A failed
/// initialization is not cached; the next caller tries again.
pub struct SharedProvider {
    connector: Arc<dyn ProviderConnector>,
    provider: OnceCell<Arc<dyn MailProvider>>,
}

impl SharedProvider {
    pub fn new(connector: Arc<dyn ProviderConnector>) -> Self {
        Self {
            connector,
            provider: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn MailProvider>, NotificationError> {
        self.provider
            .get_or_try_init(|| async {
                match self.connector.connect().await {
                    Ok(provider) => {
                        info!(
                            provider = provider.name(),
                            fallback = provider.is_fallback(),
                            "Mail provider initialized"
                        );
                        Ok(provider)
                    }
                    Err(e) => {
                        error!(error = %e, "Mail provider initialization failed");
                        Err(NotificationError::ProviderInitFailed(e.to_string()))
                    }
                }
            })
            .await
            .map(Arc::clone)
    }

    /// The active provider, if initialization already happened.
    pub fn current(&self) -> Option<Arc<dyn MailProvider>> {
        self.provider.get().map(Arc::clone)
    }

    pub fn is_initialized(&self) -> bool {
        self.provider.initialized()
    }
}
