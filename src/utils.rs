use std::{fmt::Display, future::Future};

use tokio::time::sleep;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::models::retry::RetryConfig;

/// Result of [`retry_with_backoff`] together with the number of attempts made.
#[derive(Debug)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Runs `operation` until it succeeds or `max_attempts` is reached. Attempts
/// are strictly sequential; `operation` receives the 1-based attempt number.
pub async fn retry_with_backoff<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Retried<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_with_backoff_if(config, |_| true, operation).await
}

/// Like [`retry_with_backoff`], but gives up right away on an error for
/// which `should_retry` returns false.
pub async fn retry_with_backoff_if<F, Fut, T, E, P>(
    config: &RetryConfig,
    should_retry: P,
    mut operation: F,
) -> Retried<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = config.effective_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempt, max_attempts, "Retry succeeded");
                }
                return Retried {
                    result: Ok(result),
                    attempts: attempt,
                };
            }
            Err(e) => {
                if !should_retry(&e) {
                    warn!(attempt, error = %e, "Error is not retryable, giving up");
                    return Retried {
                        result: Err(e),
                        attempts: attempt,
                    };
                }

                if attempt >= max_attempts {
                    warn!(
                        max_attempts,
                        error = %e,
                        "Retry failed after exhausting all attempts"
                    );
                    return Retried {
                        result: Err(e),
                        attempts: attempt,
                    };
                }

                let delay = config.backoff_delay(attempt);

                debug!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retry attempt failed, backing off"
                );

                sleep(delay).await;
            }
        }
    }
}

/// Installs the global tracing subscriber. `json` switches to JSON lines.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
