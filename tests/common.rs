use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use notify_service::{
    clients::{
        provider::{MailProvider, ProviderConnector},
        shared::SharedProvider,
        template::TemplateRenderer,
    },
    dispatcher::NotificationDispatcher,
    error::ProviderError,
    models::{
        message::{MailReceipt, RenderedMessage},
        retry::RetryConfig,
    },
};
use tokio::{sync::Mutex, time::Instant};

pub const FROM: &str = "Cooperative <noreply@coop.example>";

/// Provider whose behaviour is scripted per test.
#[derive(Default)]
pub struct ScriptedProvider {
    /// Number of leading sends that fail.
    pub fail_first: u32,
    /// Every send fails.
    pub always_fail: bool,
    /// Sends to this address fail.
    pub fail_for: Option<String>,
    /// Latency of the first send only.
    pub first_send_delay: Option<Duration>,
    /// Latency of every send.
    pub send_delay: Option<Duration>,
    /// Every send fails as a message the provider cannot build.
    pub unbuildable: bool,
    pub sends: AtomicU32,
    pub sent: Mutex<Vec<(Instant, RenderedMessage)>>,
}

impl ScriptedProvider {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    pub fn send_count(&self) -> u32 {
        self.sends.load(Ordering::SeqCst)
    }

    pub async fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(_, message)| message.to.clone())
            .collect()
    }
}

#[async_trait]
impl MailProvider for ScriptedProvider {
    async fn send(&self, message: &RenderedMessage) -> Result<MailReceipt, ProviderError> {
        let call = self.sends.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push((Instant::now(), message.clone()));

        if call == 0 {
            if let Some(delay) = self.first_send_delay {
                tokio::time::sleep(delay).await;
            }
        }
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }

        if self.unbuildable {
            return Err(ProviderError::InvalidMessage(
                "invalid address: missing domain".to_string(),
            ));
        }

        let targeted = self
            .fail_for
            .as_deref()
            .is_some_and(|address| address == message.to);

        if self.always_fail || call < self.fail_first || targeted {
            return Err(ProviderError::Transport("connection reset by peer".to_string()));
        }

        Ok(MailReceipt::new(format!("msg-{}", call + 1)))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Connector handing out a fixed provider and counting connect calls.
pub struct CountingConnector {
    pub provider: Arc<dyn MailProvider>,
    pub connects: AtomicU32,
    pub fail_first: u32,
    pub connect_delay: Duration,
}

impl CountingConnector {
    pub fn new(provider: Arc<dyn MailProvider>) -> Self {
        Self {
            provider,
            connects: AtomicU32::new(0),
            fail_first: 0,
            connect_delay: Duration::ZERO,
        }
    }

    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderConnector for CountingConnector {
    async fn connect(&self) -> Result<Arc<dyn MailProvider>, ProviderError> {
        let call = self.connects.fetch_add(1, Ordering::SeqCst);

        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }

        if call < self.fail_first {
            return Err(ProviderError::Init("invalid login: 535 authentication failed".to_string()));
        }

        Ok(Arc::clone(&self.provider))
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay_ms: 20,
        max_delay_ms: 100,
        backoff_multiplier: 2,
        jitter_ratio: 0.0,
    }
}

pub fn dispatcher_with(
    connector: Arc<CountingConnector>,
    retry_config: RetryConfig,
    send_timeout: Duration,
) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Arc::new(SharedProvider::new(connector)),
        TemplateRenderer::new(FROM).expect("built-in templates register"),
        retry_config,
        send_timeout,
    )
}

pub fn dispatcher_for(
    provider: Arc<ScriptedProvider>,
    retry_config: RetryConfig,
) -> (NotificationDispatcher, Arc<CountingConnector>) {
    let connector = Arc::new(CountingConnector::new(provider));
    let dispatcher = dispatcher_with(Arc::clone(&connector), retry_config, Duration::from_secs(5));
    (dispatcher, connector)
}
