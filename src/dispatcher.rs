use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    clients::{mailer::MailerConnector, shared::SharedProvider, template::TemplateRenderer},
    config::Config,
    error::NotificationError,
    models::{
        dispatch::{DispatchAttempt, DispatchResult},
        message::{MailReceipt, RenderedMessage},
        notification::NotificationRequest,
        retry::RetryConfig,
        status::DispatchState,
        validation::validate_recipient,
    },
    utils::retry_with_backoff_if,
};

/// Renders notification requests and delivers them through the shared
/// mail provider with bounded, sequential retries.
pub struct NotificationDispatcher {
    provider: Arc<SharedProvider>,
    renderer: TemplateRenderer,
    retry_config: RetryConfig,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        provider: Arc<SharedProvider>,
        renderer: TemplateRenderer,
        retry_config: RetryConfig,
        send_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            renderer,
            retry_config,
            send_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let connector = Arc::new(MailerConnector::new(config.mail_settings()));

        Ok(Self::new(
            Arc::new(SharedProvider::new(connector)),
            TemplateRenderer::new(config.from_mailbox())?,
            config.retry_config(),
            config.send_timeout(),
        ))
    }

    pub fn provider(&self) -> &Arc<SharedProvider> {
        &self.provider
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Initializes the shared provider ahead of the first dispatch.
    pub async fn warm_up(&self) -> Result<(), NotificationError> {
        let provider = self.provider.get().await?;

        if provider.is_fallback() {
            warn!(
                provider = provider.name(),
                "Fallback mail provider active, emails will only be logged"
            );
        } else {
            info!(provider = provider.name(), "Mail provider ready");
        }

        Ok(())
    }

    pub async fn dispatch(&self, request: &NotificationRequest) -> DispatchResult {
        self.dispatch_with_cancel(request, std::future::pending::<()>())
            .await
    }

    /// Like [`dispatch`](Self::dispatch) but gives up with
    /// [`NotificationError::Cancelled`] once `cancel` completes. Only this
    /// call's in-flight attempt or backoff is abandoned.
    pub async fn dispatch_with_cancel<C>(
        &self,
        request: &NotificationRequest,
        cancel: C,
    ) -> DispatchResult
    where
        C: Future<Output = ()>,
    {
        let dispatch_id = Uuid::new_v4();

        debug!(
            dispatch_id = %dispatch_id,
            kind = %request.kind(),
            recipient = %request.recipient(),
            state = %DispatchState::Pending,
            "Dispatch received"
        );

        if let Err(e) = validate_recipient(request.recipient()) {
            warn!(
                dispatch_id = %dispatch_id,
                kind = %request.kind(),
                error = %e,
                "Rejecting notification request"
            );
            return DispatchResult::failed(e, 0);
        }

        let message = self.renderer.render(request);
        let message = &message;
        let attempts_made = AtomicU32::new(0);
        let attempts_made = &attempts_made;

        let delivery = retry_with_backoff_if(
            &self.retry_config,
            NotificationError::is_retryable,
            |attempt| {
                attempts_made.store(attempt, Ordering::SeqCst);
                self.attempt(dispatch_id, message, attempt)
            },
        );

        tokio::select! {
            retried = delivery => match retried.result {
                Ok(receipt) => {
                    info!(
                        dispatch_id = %dispatch_id,
                        kind = %request.kind(),
                        recipient = %message.to,
                        message_id = %receipt.message_id,
                        attempts = retried.attempts,
                        state = %DispatchState::Succeeded,
                        "Notification delivered"
                    );
                    DispatchResult::succeeded(receipt.message_id, retried.attempts)
                }
                Err(last_error) => {
                    error!(
                        dispatch_id = %dispatch_id,
                        kind = %request.kind(),
                        recipient = %message.to,
                        attempts = retried.attempts,
                        error = %last_error,
                        state = %DispatchState::Failed,
                        "Notification delivery failed"
                    );
                    DispatchResult::failed(
                        NotificationError::DeliveryFailed {
                            attempts: retried.attempts,
                            last_error: last_error.to_string(),
                        },
                        retried.attempts,
                    )
                }
            },
            _ = cancel => {
                let attempts = attempts_made.load(Ordering::SeqCst);
                warn!(
                    dispatch_id = %dispatch_id,
                    recipient = %message.to,
                    attempts,
                    "Notification dispatch cancelled"
                );
                DispatchResult::failed(NotificationError::Cancelled, attempts)
            }
        }
    }

    /// Independent dispatches run one after another. Earlier deliveries are
    /// not undone when a later one fails.
    pub async fn dispatch_all(&self, requests: &[NotificationRequest]) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.dispatch(request).await);
        }
        results
    }

    async fn attempt(
        &self,
        dispatch_id: Uuid,
        message: &RenderedMessage,
        attempt: u32,
    ) -> Result<MailReceipt, NotificationError> {
        let record = DispatchAttempt::start(attempt);

        debug!(
            dispatch_id = %dispatch_id,
            recipient = %message.to,
            attempt,
            state = %record.state,
            "Sending notification"
        );

        let outcome = self.send_once(message).await;

        let next_state = match &outcome {
            Ok(_) => DispatchState::Succeeded,
            Err(e) if e.is_retryable() && attempt < self.retry_config.effective_attempts() => {
                DispatchState::RetryScheduled
            }
            Err(_) => DispatchState::Failed,
        };
        let record = record.finish(next_state);
        let elapsed_ms = record.elapsed.as_millis() as u64;

        match &outcome {
            Ok(receipt) => debug!(
                dispatch_id = %dispatch_id,
                attempt = record.attempt,
                started_at = %record.started_at,
                elapsed_ms,
                message_id = %receipt.message_id,
                "Attempt succeeded"
            ),
            Err(NotificationError::ProviderInitFailed(reason)) => error!(
                dispatch_id = %dispatch_id,
                attempt = record.attempt,
                elapsed_ms,
                next_state = %record.state,
                reason = %reason,
                "Attempt failed: mail provider could not be initialized"
            ),
            Err(e) => warn!(
                dispatch_id = %dispatch_id,
                attempt = record.attempt,
                elapsed_ms,
                next_state = %record.state,
                error = %e,
                "Attempt failed"
            ),
        }

        outcome
    }

    /// One attempt: acquire the provider, then send. Both steps share a
    /// single `send_timeout` deadline.
    async fn send_once(&self, message: &RenderedMessage) -> Result<MailReceipt, NotificationError> {
        let deadline = Instant::now() + self.send_timeout;

        let provider = timeout_at(deadline, self.provider.get())
            .await
            .map_err(|_| {
                NotificationError::ProviderInitFailed(format!(
                    "initialization timed out after {}ms",
                    self.send_timeout.as_millis()
                ))
            })??;

        match timeout_at(deadline, provider.send(message)).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => Err(NotificationError::from(e)),
            Err(_) => Err(NotificationError::DeliveryTimeout(self.send_timeout)),
        }
    }
}
