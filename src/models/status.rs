use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

/// Lifecycle of one dispatch call.
///
/// `Pending -> Attempting -> (Succeeded | RetryScheduled -> Attempting | Failed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    Pending,
    Attempting,
    RetryScheduled,
    Succeeded,
    Failed,
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Succeeded | DispatchState::Failed)
    }
}

impl Display for DispatchState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DispatchState::Pending => write!(f, "pending"),
            DispatchState::Attempting => write!(f, "attempting"),
            DispatchState::RetryScheduled => write!(f, "retry_scheduled"),
            DispatchState::Succeeded => write!(f, "succeeded"),
            DispatchState::Failed => write!(f, "failed"),
        }
    }
}
