use std::collections::BTreeMap;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Degraded maps to 200; the logging fallback still accepts sends.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<String, ProviderHealth>,
}

/// Readiness of the shared mail provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default)]
    pub fallback: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderHealth {
    pub fn ready(provider: &str, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            provider: Some(provider.to_string()),
            fallback: false,
            response_time_ms: Some(response_time_ms),
            error: None,
        }
    }

    pub fn fallback(provider: &str) -> Self {
        Self {
            status: HealthStatus::Degraded,
            provider: Some(provider.to_string()),
            fallback: true,
            response_time_ms: None,
            error: Some("Using logging fallback, emails are not delivered".to_string()),
        }
    }

    pub fn unavailable(provider: Option<&str>, error: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            provider: provider.map(str::to_string),
            fallback: false,
            response_time_ms: None,
            error: Some(error),
        }
    }
}
