use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client as SecretsClient;
use aws_sdk_secretsmanager::error::DisplayErrorContext;

use crate::error::{NotifyError, NotifyResult};
use crate::Notifier;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, serde::Deserialize)]
struct WebhookSecret {
    url: String,
}

#[derive(Debug, serde::Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
}

/// Where the webhook URL comes from.
#[derive(Debug, Clone)]
pub enum WebhookEndpoint {
    /// Looked up from Secrets Manager on every delivery, so a rotated
    /// secret is picked up without a restart.
    Secret {
        client: SecretsClient,
        secret_id: String,
    },
    /// A fixed URL, handy for local runs.
    Url(String),
}

/// The secret is either `{"url": "https://hooks.slack.com/..."}` or the bare URL.
pub fn parse_webhook_secret(secret: &str) -> String {
    match serde_json::from_str::<WebhookSecret>(secret) {
        Ok(parsed) => parsed.url,
        Err(_) => secret.to_string(),
    }
}

pub struct SlackWebhookNotifier {
    http: reqwest::Client,
    endpoint: WebhookEndpoint,
}

impl SlackWebhookNotifier {
    pub fn new(endpoint: WebhookEndpoint) -> NotifyResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()?;
        Ok(SlackWebhookNotifier { http, endpoint })
    }

    pub async fn from_secret(secret_id: &str) -> NotifyResult<Self> {
        let client = SecretsClient::new(&aws_config::load_from_env().await);
        Self::new(WebhookEndpoint::Secret {
            client,
            secret_id: secret_id.to_string(),
        })
    }

    async fn webhook_url(&self) -> NotifyResult<String> {
        match &self.endpoint {
            WebhookEndpoint::Url(url) => Ok(url.clone()),
            WebhookEndpoint::Secret { client, secret_id } => {
                let output = client
                    .get_secret_value()
                    .secret_id(secret_id)
                    .send()
                    .await
                    .map_err(|err| {
                        NotifyError::SecretUnavailable(DisplayErrorContext(&err).to_string())
                    })?;

                let secret = output.secret_string().ok_or_else(|| {
                    NotifyError::SecretUnavailable(format!(
                        "secret {} has no string value",
                        secret_id
                    ))
                })?;

                Ok(parse_webhook_secret(secret))
            }
        }
    }
}

#[async_trait]
impl Notifier for SlackWebhookNotifier {
    async fn deliver(&self, text: &str) -> NotifyResult<()> {
        let url = self.webhook_url().await?;

        let response = self
            .http
            .post(&url)
            .json(&SlackPayload { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable>".to_string());
            tracing::error!("Slack webhook rejected the alert with status {}", status);
            return Err(NotifyError::Rejected { status, body });
        }

        tracing::info!("Alert delivered to Slack");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier_for(server: &MockServer) -> SlackWebhookNotifier {
        let url = format!("{}/services/T0/B0/xyz", server.uri());
        SlackWebhookNotifier::new(WebhookEndpoint::Url(url)).unwrap()
    }

    #[test]
    fn secret_may_be_json_or_bare_url() {
        assert_eq!(
            parse_webhook_secret(r#"{"url": "https://hooks.slack.com/services/T0/B0/abc"}"#),
            "https://hooks.slack.com/services/T0/B0/abc"
        );
        assert_eq!(
            parse_webhook_secret("https://hooks.slack.com/services/T0/B0/abc"),
            "https://hooks.slack.com/services/T0/B0/abc"
        );
    }

    #[test]
    fn json_without_url_string_is_used_verbatim() {
        assert_eq!(parse_webhook_secret(r#"{"token": "x"}"#), r#"{"token": "x"}"#);
        assert_eq!(parse_webhook_secret(r#"{"url": 5}"#), r#"{"url": 5}"#);
    }

    #[tokio::test]
    async fn posts_text_payload_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/T0/B0/xyz"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "text": "line one\nline two" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        notifier_for(&server)
            .deliver("line one\nline two")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let err = notifier_for(&server).deliver("hello").await.unwrap_err();
        match err {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(body, "no_service");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_transport_error() {
        let endpoint = WebhookEndpoint::Url("http://127.0.0.1:9/hook".to_string());
        let notifier = SlackWebhookNotifier::new(endpoint).unwrap();
        let err = notifier.deliver("hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }
}
