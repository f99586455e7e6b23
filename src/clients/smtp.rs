//! Gmail / generic SMTP provider built on lettre.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    clients::provider::MailProvider,
    error::ProviderError,
    models::message::{MailReceipt, RenderedMessage},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS, Gmail on port 465.
    #[default]
    Tls,
    /// STARTTLS upgrade, port 587.
    StartTls,
    /// Plaintext, local Mailpit/MailHog only.
    None,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub security: SmtpSecurity,
}

impl SmtpSettings {
    pub fn gmail(username: String, password: String) -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            username: Some(username),
            password: Some(password),
            security: SmtpSecurity::Tls,
        }
    }

    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.username, &self.password),
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty()
        )
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, ProviderError> {
        if settings.security != SmtpSecurity::None && !settings.has_credentials() {
            return Err(ProviderError::Init(format!(
                "SMTP credentials missing for {}",
                settings.host
            )));
        }

        let transport = Self::build_transport(settings)?;

        info!(host = %settings.host, port = settings.port, "SMTP transport configured");

        Ok(Self {
            transport,
            host: settings.host.clone(),
        })
    }

    fn build_transport(
        settings: &SmtpSettings,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, ProviderError> {
        let mut builder = match settings.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| ProviderError::Init(format!("Failed to create SMTP relay: {}", e)))?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host).map_err(
                    |e| ProviderError::Init(format!("Failed to create STARTTLS relay: {}", e)),
                )?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
        }
        .port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    fn build_message(message: &RenderedMessage) -> Result<(Message, String), ProviderError> {
        let from: Mailbox = message.from.parse()?;
        let to: Mailbox = message.to.parse()?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

        let builder = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .message_id(Some(message_id.clone()));

        let email = match &message.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                html.clone(),
            ))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.text.clone())?,
        };

        Ok((email, message_id))
    }
}

#[async_trait]
impl MailProvider for SmtpMailer {
    async fn send(&self, message: &RenderedMessage) -> Result<MailReceipt, ProviderError> {
        debug!(
            to = %message.to,
            subject = %message.subject,
            host = %self.host,
            "Sending email via SMTP"
        );

        let (email, message_id) = Self::build_message(message)?;

        self.transport.send(email).await.map_err(|e| {
            error!(to = %message.to, error = %e, "SMTP send failed");

            if e.is_permanent() {
                ProviderError::Rejected(e.to_string())
            } else {
                ProviderError::Transport(e.to_string())
            }
        })?;

        Ok(MailReceipt::new(message_id))
    }

    async fn verify(&self) -> Result<bool, ProviderError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| ProviderError::Transport(format!("SMTP connection check failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gmail_settings() {
        let settings = SmtpSettings::gmail("coop@gmail.com".to_string(), "app-pass".to_string());
        assert_eq!(settings.host, "smtp.gmail.com");
        assert_eq!(settings.port, 465);
        assert!(settings.has_credentials());
    }

    #[test]
    fn test_tls_without_credentials_is_init_error() {
        let settings = SmtpSettings {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            username: None,
            password: None,
            security: SmtpSecurity::Tls,
        };

        assert!(matches!(
            SmtpMailer::new(&settings),
            Err(ProviderError::Init(_))
        ));
    }

    #[test]
    fn test_message_id_uses_sender_domain() {
        let message = RenderedMessage {
            from: "Cooperative <noreply@coop.example>".to_string(),
            to: "member@example.com".to_string(),
            subject: "Hello".to_string(),
            text: "Body".to_string(),
            html: None,
        };

        let (_, message_id) = SmtpMailer::build_message(&message).unwrap();
        assert!(message_id.ends_with("@coop.example>"));
    }

    #[test]
    fn test_invalid_recipient_is_invalid_message() {
        let message = RenderedMessage {
            from: "noreply@coop.example".to_string(),
            to: "not-an-address".to_string(),
            subject: "Hello".to_string(),
            text: "Body".to_string(),
            html: None,
        };

        assert!(matches!(
            SmtpMailer::build_message(&message),
            Err(ProviderError::InvalidMessage(_))
        ));
    }
}
