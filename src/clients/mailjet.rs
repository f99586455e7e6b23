//! Mailjet transactional email provider (Send API v3.1).

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    clients::provider::MailProvider,
    error::ProviderError,
    models::message::{MailReceipt, RenderedMessage},
};

pub const DEFAULT_MAILJET_API_URL: &str = "https://api.mailjet.com/v3.1";

#[derive(Debug, Clone)]
pub struct MailjetSettings {
    pub api_key: String,
    pub secret_key: String,
    pub api_url: String,
}

pub struct MailjetMailer {
    http_client: Client,
    settings: MailjetSettings,
}

impl MailjetMailer {
    pub fn new(settings: MailjetSettings) -> Result<Self, ProviderError> {
        if settings.api_key.is_empty() || settings.secret_key.is_empty() {
            return Err(ProviderError::Init(
                "Mailjet API key and secret key are required".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Init(format!("Failed to create HTTP client: {}", e)))?;

        info!(api_url = %settings.api_url, "Mailjet client initialized");

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn build_request(message: &RenderedMessage) -> Result<SendRequest, ProviderError> {
        let from: Mailbox = message.from.parse()?;
        let to: Mailbox = message.to.parse()?;

        Ok(SendRequest {
            messages: vec![OutgoingMessage {
                from: Contact::from(from),
                to: vec![Contact::from(to)],
                subject: message.subject.clone(),
                text_part: message.text.clone(),
                html_part: message.html.clone(),
            }],
        })
    }
}

#[derive(Debug, Serialize)]
struct SendRequest {
    #[serde(rename = "Messages")]
    messages: Vec<OutgoingMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct OutgoingMessage {
    from: Contact,
    to: Vec<Contact>,
    subject: String,
    text_part: String,

    #[serde(rename = "HTMLPart", skip_serializing_if = "Option::is_none")]
    html_part: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Contact {
    email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl From<Mailbox> for Contact {
    fn from(mailbox: Mailbox) -> Self {
        Self {
            email: mailbox.email.to_string(),
            name: mailbox.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "Messages", default)]
    messages: Vec<MessageResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MessageResult {
    status: String,

    #[serde(default)]
    to: Vec<RecipientResult>,

    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecipientResult {
    #[serde(rename = "MessageID")]
    message_id: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorDetail {
    error_message: String,
}

#[async_trait]
impl MailProvider for MailjetMailer {
    async fn send(&self, message: &RenderedMessage) -> Result<MailReceipt, ProviderError> {
        let request = Self::build_request(message)?;
        let url = format!("{}/send", self.settings.api_url.trim_end_matches('/'));

        debug!(to = %message.to, subject = %message.subject, "Sending email via Mailjet");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.settings.api_key, Some(&self.settings.secret_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Mailjet rejected credentials");
            return Err(ProviderError::Authentication(format!(
                "Mailjet returned {}: {}",
                status, body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Mailjet request failed");
            return Err(ProviderError::Rejected(format!(
                "Mailjet returned {}: {}",
                status, body
            )));
        }

        let body: SendResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(format!("Invalid Mailjet response: {}", e)))?;

        let result = body
            .messages
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Transport("Mailjet response had no messages".to_string()))?;

        if !result.status.eq_ignore_ascii_case("success") {
            let reason = result
                .errors
                .into_iter()
                .map(|e| e.error_message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ProviderError::Rejected(format!(
                "Mailjet status {}: {}",
                result.status, reason
            )));
        }

        let message_id = result
            .to
            .first()
            .map(|r| match &r.message_id {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .ok_or_else(|| ProviderError::Transport("Mailjet response had no MessageID".to_string()))?;

        info!(to = %message.to, message_id = %message_id, "Email accepted by Mailjet");

        Ok(MailReceipt::new(message_id))
    }

    fn name(&self) -> &'static str {
        "mailjet"
    }
}
