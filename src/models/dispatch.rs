use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::{ErrorKind, NotificationError},
    models::status::DispatchState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOutcome {
    Success,
    Failure,
}

/// Terminal result of a dispatch call.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub outcome: DispatchOutcome,
    /// Set only on success.
    pub message_id: Option<String>,
    /// Set only on failure.
    pub error: Option<NotificationError>,
    pub attempts: u32,
}

impl DispatchResult {
    pub fn succeeded(message_id: String, attempts: u32) -> Self {
        Self {
            outcome: DispatchOutcome::Success,
            message_id: Some(message_id),
            error: None,
            attempts,
        }
    }

    pub fn failed(error: NotificationError, attempts: u32) -> Self {
        Self {
            outcome: DispatchOutcome::Failure,
            message_id: None,
            error: Some(error),
            attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == DispatchOutcome::Success
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(NotificationError::kind)
    }

    pub fn state(&self) -> DispatchState {
        match self.outcome {
            DispatchOutcome::Success => DispatchState::Succeeded,
            DispatchOutcome::Failure => DispatchState::Failed,
        }
    }
}

/// Bookkeeping for one attempt inside a dispatch call. Never leaves it.
#[derive(Debug, Clone)]
pub struct DispatchAttempt {
    pub attempt: u32,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub state: DispatchState,
}

impl DispatchAttempt {
    pub fn start(attempt: u32) -> Self {
        Self {
            attempt,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            state: DispatchState::Attempting,
        }
    }

    pub fn finish(mut self, state: DispatchState) -> Self {
        self.elapsed = (Utc::now() - self.started_at)
            .to_std()
            .unwrap_or_default();
        self.state = state;
        self
    }
}
