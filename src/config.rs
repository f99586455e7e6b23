use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::{
    clients::{
        mailer::{MailSettings, ProviderKind},
        mailjet::{DEFAULT_MAILJET_API_URL, MailjetSettings},
        smtp::{SmtpSecurity, SmtpSettings},
    },
    models::retry::RetryConfig,
};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub mail_provider: ProviderKind,
    pub mail_from_email: String,
    #[serde(default = "default_from_name")]
    pub mail_from_name: String,
    #[serde(default = "default_true")]
    pub mail_fallback_enabled: bool,
    #[serde(default)]
    pub mail_verify_on_connect: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_security: SmtpSecurity,

    pub mailjet_api_key: Option<String>,
    pub mailjet_secret_key: Option<String>,
    #[serde(default = "default_mailjet_api_url")]
    pub mailjet_api_url: String,

    pub owner_email: Option<String>,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: u64,
    #[serde(default)]
    pub retry_jitter_ratio: f64,

    #[serde(default = "default_send_timeout_seconds")]
    pub send_timeout_seconds: u64,
    pub request_deadline_seconds: Option<u64>,
}

fn default_server_port() -> u16 {
    3000
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_from_name() -> String {
    "Cooperative".to_string()
}

fn default_true() -> bool {
    true
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_mailjet_api_url() -> String {
    DEFAULT_MAILJET_API_URL.to_string()
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_initial_retry_delay_ms() -> u64 {
    1000
}

fn default_max_retry_delay_ms() -> u64 {
    10_000
}

fn default_retry_backoff_multiplier() -> u64 {
    2
}

fn default_send_timeout_seconds() -> u64 {
    15
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Builds a config from explicit key/value pairs (upper-case keys).
    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.mail_from_email.trim().is_empty() {
            return Err(anyhow!("MAIL_FROM_EMAIL must not be empty"));
        }

        if !(0.0..=1.0).contains(&self.retry_jitter_ratio) {
            return Err(anyhow!("RETRY_JITTER_RATIO must be between 0.0 and 1.0"));
        }

        if self.send_timeout_seconds == 0 {
            return Err(anyhow!("SEND_TIMEOUT_SECONDS must be greater than zero"));
        }

        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retry_attempts,
            initial_delay_ms: self.initial_retry_delay_ms,
            max_delay_ms: self.max_retry_delay_ms,
            backoff_multiplier: self.retry_backoff_multiplier,
            jitter_ratio: self.retry_jitter_ratio,
        }
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_seconds)
    }

    pub fn request_deadline(&self) -> Option<Duration> {
        self.request_deadline_seconds.map(Duration::from_secs)
    }

    /// Sender mailbox in `Name <address>` form.
    pub fn from_mailbox(&self) -> String {
        format!("{} <{}>", self.mail_from_name, self.mail_from_email.trim())
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    pub fn mail_settings(&self) -> MailSettings {
        let mailjet = match (&self.mailjet_api_key, &self.mailjet_secret_key) {
            (Some(api_key), Some(secret_key)) => Some(MailjetSettings {
                api_key: api_key.clone(),
                secret_key: secret_key.clone(),
                api_url: self.mailjet_api_url.clone(),
            }),
            _ => None,
        };

        MailSettings {
            provider: self.mail_provider,
            smtp: SmtpSettings {
                host: self.smtp_host.clone(),
                port: self.smtp_port,
                username: self.smtp_username.clone(),
                password: self.smtp_password.clone(),
                security: self.smtp_security,
            },
            mailjet,
            fallback_enabled: self.mail_fallback_enabled,
            verify_on_connect: self.mail_verify_on_connect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply() {
        let config = Config::from_vars(vars(&[("MAIL_FROM_EMAIL", "noreply@coop.example")])).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.mail_provider, ProviderKind::Smtp);
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_security, SmtpSecurity::Tls);
        assert_eq!(config.max_retry_attempts, 3);
        assert_eq!(config.send_timeout(), Duration::from_secs(15));
        assert!(config.mail_fallback_enabled);
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.from_mailbox(), "Cooperative <noreply@coop.example>");
    }

    #[test]
    fn test_overrides_and_lists() {
        let config = Config::from_vars(vars(&[
            ("MAIL_FROM_EMAIL", "noreply@coop.example"),
            ("MAIL_PROVIDER", "mailjet"),
            ("MAILJET_API_KEY", "key"),
            ("MAILJET_SECRET_KEY", "secret"),
            ("SMTP_SECURITY", "starttls"),
            ("ALLOWED_ORIGINS", "http://localhost:3000,https://admin.coop.example"),
            ("MAX_RETRY_ATTEMPTS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.mail_provider, ProviderKind::Mailjet);
        assert_eq!(config.smtp_security, SmtpSecurity::StartTls);
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.retry_config().max_attempts, 2);
        assert!(config.mail_settings().mailjet.is_some());
    }

    #[test]
    fn test_missing_sender_is_rejected() {
        assert!(Config::from_vars(vars(&[])).is_err());
    }

    #[test]
    fn test_jitter_out_of_range_is_rejected() {
        let result = Config::from_vars(vars(&[
            ("MAIL_FROM_EMAIL", "noreply@coop.example"),
            ("RETRY_JITTER_RATIO", "1.5"),
        ]));
        assert!(result.is_err());
    }
}
