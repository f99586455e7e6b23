use std::{sync::Arc, time::Duration};

use anyhow::Result;
use notify_service::{
    clients::{
        mailer::{MailSettings, MailerConnector, ProviderKind},
        mailjet::{MailjetMailer, MailjetSettings},
        provider::MailProvider,
        shared::SharedProvider,
        smtp::{SmtpSecurity, SmtpSettings},
        template::TemplateRenderer,
    },
    dispatcher::NotificationDispatcher,
    error::ProviderError,
    models::{
        message::RenderedMessage,
        notification::{NotificationKind, NotificationRequest},
    },
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{basic_auth, body_partial_json, method, path},
};

use crate::common::{FROM, fast_retry};

fn settings_for(server: &MockServer) -> MailjetSettings {
    MailjetSettings {
        api_key: "public-key".to_string(),
        secret_key: "private-key".to_string(),
        api_url: format!("{}/v3.1", server.uri()),
    }
}

fn message() -> RenderedMessage {
    RenderedMessage {
        from: FROM.to_string(),
        to: "member@example.com".to_string(),
        subject: "Your Deposit Has Been Approved".to_string(),
        text: "Dear Cruz".to_string(),
        html: Some("<p>Dear Cruz</p>".to_string()),
    }
}

fn accepted(message_id: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Messages": [{
            "Status": "success",
            "To": [{
                "Email": "member@example.com",
                "MessageUUID": "1ab23cd4-e567-8901-2345-6789f0gh1i2j",
                "MessageID": message_id,
                "MessageHref": "https://api.mailjet.com/v3/message/1"
            }]
        }]
    }))
}

/// Test: Accepted sends return the MessageID reported by Mailjet
#[tokio::test]
async fn test_send_returns_mailjet_message_id() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .and(basic_auth("public-key", "private-key"))
        .and(body_partial_json(json!({
            "Messages": [{
                "From": { "Email": "noreply@coop.example", "Name": "Cooperative" },
                "To": [{ "Email": "member@example.com" }],
                "Subject": "Your Deposit Has Been Approved"
            }]
        })))
        .respond_with(accepted(1152921504606846976))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = MailjetMailer::new(settings_for(&server))?;
    let receipt = mailer.send(&message()).await?;

    assert_eq!(receipt.message_id, "1152921504606846976");

    Ok(())
}

/// Test: Rejected credentials map to an authentication error
#[tokio::test]
async fn test_unauthorized_is_authentication_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .respond_with(ResponseTemplate::new(401).set_body_string("API key authentication/authorization failure"))
        .mount(&server)
        .await;

    let mailer = MailjetMailer::new(settings_for(&server))?;
    let err = mailer.send(&message()).await.expect_err("401 must fail");

    assert!(matches!(err, ProviderError::Authentication(_)), "{:?}", err);

    Ok(())
}

/// Test: Server errors map to a rejected send
#[tokio::test]
async fn test_server_error_is_rejected() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mailer = MailjetMailer::new(settings_for(&server))?;
    let err = mailer.send(&message()).await.expect_err("500 must fail");

    assert!(matches!(err, ProviderError::Rejected(_)), "{:?}", err);

    Ok(())
}

/// Test: A per-message error status is reported with its reason
#[tokio::test]
async fn test_message_error_status_is_rejected() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Messages": [{
                "Status": "error",
                "Errors": [{
                    "ErrorIdentifier": "88b5ca9f-5f1f-42e7-a45e-9ecbad0c285e",
                    "ErrorCode": "send-0003",
                    "StatusCode": 400,
                    "ErrorMessage": "At least \"HTMLPart\", \"TextPart\" or \"TemplateID\" must be provided.",
                    "ErrorRelatedTo": ["HTMLPart", "TextPart"]
                }]
            }]
        })))
        .mount(&server)
        .await;

    let mailer = MailjetMailer::new(settings_for(&server))?;
    let err = mailer.send(&message()).await.expect_err("error status must fail");

    match err {
        ProviderError::Rejected(reason) => assert!(reason.contains("TextPart"), "{}", reason),
        other => panic!("expected Rejected, got {:?}", other),
    }

    Ok(())
}

/// Test: The production connector retries a flaky Mailjet until it accepts
#[tokio::test]
async fn test_dispatcher_retries_through_mailjet() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3.1/send"))
        .respond_with(accepted(42))
        .expect(1)
        .mount(&server)
        .await;

    let settings = MailSettings {
        provider: ProviderKind::Mailjet,
        smtp: SmtpSettings {
            host: "localhost".to_string(),
            port: 1025,
            username: None,
            password: None,
            security: SmtpSecurity::None,
        },
        mailjet: Some(settings_for(&server)),
        fallback_enabled: false,
        verify_on_connect: false,
    };

    let dispatcher = NotificationDispatcher::new(
        Arc::new(SharedProvider::new(Arc::new(MailerConnector::new(settings)))),
        TemplateRenderer::new(FROM)?,
        fast_retry(3),
        Duration::from_secs(5),
    );

    let request = NotificationRequest::new(NotificationKind::DepositApproved, "member@example.com")
        .with_last_name("Cruz")
        .with_param("amount", "PHP 2,500.00");

    let result = dispatcher.dispatch(&request).await;

    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.message_id.as_deref(), Some("42"));

    Ok(())
}
