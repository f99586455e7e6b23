use std::{collections::BTreeMap, sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::shared::SharedProvider,
    models::health::{HealthCheckResponse, HealthStatus, ProviderHealth},
};

pub struct HealthChecker {
    provider: Arc<SharedProvider>,
}

impl HealthChecker {
    pub fn new(provider: Arc<SharedProvider>) -> Self {
        Self { provider }
    }

    /// Probes the mail provider, initializing it if nobody has yet.
    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = BTreeMap::new();
        checks.insert("mail_provider".to_string(), self.check_mail_provider().await);

        // worst component wins
        let status = checks
            .values()
            .map(|health| health.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        HealthCheckResponse {
            status,
            timestamp: Utc::now(),
            checks,
        }
    }

    async fn check_mail_provider(&self) -> ProviderHealth {
        let start = Instant::now();

        let provider = match self.provider.get().await {
            Ok(provider) => provider,
            Err(e) => {
                warn!(error = %e, "Mail provider unavailable");
                return ProviderHealth::unavailable(None, e.to_string());
            }
        };

        if provider.is_fallback() {
            return ProviderHealth::fallback(provider.name());
        }

        match provider.verify().await {
            Ok(true) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(
                    provider = provider.name(),
                    response_time_ms = elapsed,
                    "Mail provider health check passed"
                );
                ProviderHealth::ready(provider.name(), elapsed)
            }
            Ok(false) => ProviderHealth::unavailable(
                Some(provider.name()),
                "Mail provider reported not ready".to_string(),
            ),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "Mail provider health check failed");
                ProviderHealth::unavailable(Some(provider.name()), format!("Verification failed: {}", e))
            }
        }
    }
}
