use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    clients::{
        logging::LoggingMailer,
        mailjet::{MailjetMailer, MailjetSettings},
        provider::{MailProvider, ProviderConnector},
        smtp::{SmtpMailer, SmtpSettings},
    },
    error::ProviderError,
    models::message::{MailReceipt, RenderedMessage},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Smtp,
    Mailjet,
    Logging,
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub provider: ProviderKind,
    pub smtp: SmtpSettings,
    pub mailjet: Option<MailjetSettings>,
    pub fallback_enabled: bool,
    pub verify_on_connect: bool,
}

/// The active mail provider. Which variant is live is decided once, when
/// the shared provider is first initialized.
pub enum Mailer {
    Smtp(SmtpMailer),
    Mailjet(MailjetMailer),
    Logging(LoggingMailer),
}

impl Mailer {
    /// Builds the configured provider. Construction errors fall back to
    /// [`Mailer::Logging`] when the settings allow it.
    pub fn select(settings: &MailSettings) -> Result<Self, ProviderError> {
        let built = match settings.provider {
            ProviderKind::Smtp => SmtpMailer::new(&settings.smtp).map(Mailer::Smtp),
            ProviderKind::Mailjet => settings
                .mailjet
                .clone()
                .ok_or_else(|| ProviderError::Init("Mailjet settings missing".to_string()))
                .and_then(MailjetMailer::new)
                .map(Mailer::Mailjet),
            ProviderKind::Logging => Ok(Mailer::Logging(LoggingMailer)),
        };

        match built {
            Ok(mailer) => Ok(mailer),
            Err(e) if settings.fallback_enabled => {
                warn!(
                    provider = ?settings.provider,
                    error = %e,
                    "Mail provider unavailable, falling back to logging provider"
                );
                Ok(Mailer::Logging(LoggingMailer))
            }
            Err(e) => Err(e),
        }
    }

    fn inner(&self) -> &dyn MailProvider {
        match self {
            Mailer::Smtp(mailer) => mailer,
            Mailer::Mailjet(mailer) => mailer,
            Mailer::Logging(mailer) => mailer,
        }
    }
}

#[async_trait]
impl MailProvider for Mailer {
    async fn send(&self, message: &RenderedMessage) -> Result<MailReceipt, ProviderError> {
        self.inner().send(message).await
    }

    async fn verify(&self) -> Result<bool, ProviderError> {
        self.inner().verify().await
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn is_fallback(&self) -> bool {
        matches!(self, Mailer::Logging(_))
    }
}

/// Connector used in production: selects a [`Mailer`] from settings and
/// optionally checks it before handing it out.
pub struct MailerConnector {
    settings: MailSettings,
}

impl MailerConnector {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ProviderConnector for MailerConnector {
    async fn connect(&self) -> Result<Arc<dyn MailProvider>, ProviderError> {
        let mailer = Mailer::select(&self.settings)?;

        if self.settings.verify_on_connect && !mailer.is_fallback() {
            match mailer.verify().await {
                Ok(true) => info!(provider = mailer.name(), "Mail provider verified"),
                Ok(false) => {
                    return Err(ProviderError::Init(format!(
                        "{} provider is not ready",
                        mailer.name()
                    )));
                }
                Err(e) => return Err(ProviderError::Init(e.to_string())),
            }
        }

        Ok(Arc::new(mailer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::smtp::SmtpSecurity;

    fn settings(provider: ProviderKind, fallback_enabled: bool) -> MailSettings {
        MailSettings {
            provider,
            smtp: SmtpSettings {
                host: "smtp.gmail.com".to_string(),
                port: 465,
                username: None,
                password: None,
                security: SmtpSecurity::Tls,
            },
            mailjet: None,
            fallback_enabled,
            verify_on_connect: false,
        }
    }

    #[test]
    fn test_missing_credentials_falls_back_to_logging() {
        let mailer = Mailer::select(&settings(ProviderKind::Smtp, true)).unwrap();
        assert!(mailer.is_fallback());
        assert_eq!(mailer.name(), "logging");
    }

    #[test]
    fn test_missing_credentials_without_fallback_is_error() {
        let result = Mailer::select(&settings(ProviderKind::Mailjet, false));
        assert!(matches!(result, Err(ProviderError::Init(_))));
    }

    #[test]
    fn test_logging_selected_explicitly() {
        let mailer = Mailer::select(&settings(ProviderKind::Logging, false)).unwrap();
        assert!(matches!(mailer, Mailer::Logging(_)));
    }
}
