//! Error types for notification dispatch.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by the dispatcher, either per attempt or as the terminal
/// outcome of a dispatch call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    /// Missing or malformed recipient, unknown kind, or a message the
    /// provider cannot build. Never retried.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The mail provider could not be constructed or authenticated.
    #[error("Mail provider initialization failed: {0}")]
    ProviderInitFailed(String),

    /// A single attempt did not finish within the send timeout.
    #[error("Delivery attempt timed out after {}ms", .0.as_millis())]
    DeliveryTimeout(Duration),

    /// The provider rejected or failed to transmit the message.
    #[error("Mail provider error: {0}")]
    Provider(String),

    /// All attempts were used up.
    #[error("Delivery failed after {attempts} attempt(s): {last_error}")]
    DeliveryFailed { attempts: u32, last_error: String },

    /// The caller abandoned the dispatch.
    #[error("Dispatch cancelled by caller")]
    Cancelled,
}

impl NotificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotificationError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            NotificationError::ProviderInitFailed(_) => ErrorKind::ProviderInitFailed,
            NotificationError::DeliveryTimeout(_) => ErrorKind::DeliveryTimeout,
            NotificationError::Provider(_) => ErrorKind::Provider,
            NotificationError::DeliveryFailed { .. } => ErrorKind::DeliveryFailed,
            NotificationError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NotificationError::ProviderInitFailed(_)
                | NotificationError::DeliveryTimeout(_)
                | NotificationError::Provider(_)
        )
    }
}

/// Fieldless discriminant of [`NotificationError`], handy for assertions and
/// status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    ProviderInitFailed,
    DeliveryTimeout,
    Provider,
    DeliveryFailed,
    Cancelled,
}

/// Errors raised by a [`MailProvider`](crate::clients::provider::MailProvider)
/// implementation.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("provider setup failed: {0}")]
    Init(String),

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("message rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl From<ProviderError> for NotificationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Init(msg) => NotificationError::ProviderInitFailed(msg),
            ProviderError::InvalidMessage(msg) => {
                NotificationError::InvalidRequest(format!("invalid message: {}", msg))
            }
            other => NotificationError::Provider(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

impl From<lettre::error::Error> for ProviderError {
    fn from(err: lettre::error::Error) -> Self {
        ProviderError::InvalidMessage(err.to_string())
    }
}

impl From<lettre::address::AddressError> for ProviderError {
    fn from(err: lettre::address::AddressError) -> Self {
        ProviderError::InvalidMessage(format!("invalid address: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_errors_become_provider_init_failed() {
        let err = NotificationError::from(ProviderError::Init("bad login".to_string()));
        assert_eq!(err, NotificationError::ProviderInitFailed("bad login".to_string()));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_send_errors_are_retryable_provider_errors() {
        let err = NotificationError::from(ProviderError::Transport("reset".to_string()));
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("transport error: reset"));
    }

    #[test]
    fn test_unbuildable_message_is_not_retryable() {
        let err = NotificationError::from(ProviderError::InvalidMessage(
            "invalid address: missing domain".to_string(),
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_terminal_errors_are_not_retryable() {
        assert!(!NotificationError::InvalidRequest("empty".to_string()).is_retryable());
        assert!(!NotificationError::Cancelled.is_retryable());
        assert!(
            !NotificationError::DeliveryFailed {
                attempts: 3,
                last_error: "reset".to_string(),
            }
            .is_retryable()
        );
    }
}
