use serde::{Deserialize, Serialize};

/// JSON body returned by the notification endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

impl NotifyResponse {
    pub fn success(message_id: Option<String>, attempts: u32) -> Self {
        Self {
            message: "Email sent successfully".to_string(),
            message_id,
            error: None,
            attempts: Some(attempts),
        }
    }

    pub fn error(error: String, message: String) -> Self {
        Self {
            message,
            message_id: None,
            error: Some(error),
            attempts: None,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }
}
