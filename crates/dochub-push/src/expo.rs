//! Expo push API provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use dochub_core::config::ExpoConfig;
use dochub_core::error::{AppError, ErrorKind};

use crate::error::PushError;
use crate::message::PushMessage;
use crate::provider::PushProvider;

const PROVIDER: &str = "expo";

/// Error signature Expo uses for tokens that will never work again.
const INVALID_TOKEN_MARKER: &str = "DeviceNotRegistered";

/// Error signature for rejected project credentials.
const CREDENTIALS_MARKER: &str = "InvalidCredentials";

#[derive(Debug, Serialize)]
struct ExpoRequest<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    sound: &'static str,
    priority: &'static str,
    #[serde(rename = "channelId")]
    channel_id: &'a str,
    data: ExpoData<'a>,
}

#[derive(Debug, Serialize)]
struct ExpoData<'a> {
    user_id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "channelId")]
    channel_id: &'a str,
}

/// Sends to `exp.host` push tickets.
#[derive(Debug, Clone)]
pub struct ExpoProvider {
    client: reqwest::Client,
    endpoint: String,
    channel_id: String,
    apns_topic: Option<String>,
}

impl ExpoProvider {
    /// Build a provider with its own HTTP client bounded by the configured timeout.
    pub fn new(config: &ExpoConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build Expo client", e)
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            channel_id: config.channel_id.clone(),
            apns_topic: config.apns_topic.clone(),
        })
    }
}

#[async_trait]
impl PushProvider for ExpoProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        let payload = ExpoRequest {
            to: token,
            title: &message.title,
            body: &message.body,
            sound: "default",
            priority: "high",
            channel_id: &self.channel_id,
            data: ExpoData {
                user_id: message.user_id.to_string(),
                kind: "notification",
                channel_id: &self.channel_id,
            },
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .header("apns-push-type", "alert")
            .header("apns-priority", "10")
            .json(&payload);
        if let Some(topic) = &self.apns_topic {
            request = request.header("apns-topic", topic);
        }

        let response = request.send().await.map_err(|source| PushError::Transport {
            provider: PROVIDER,
            source,
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| PushError::Transport {
            provider: PROVIDER,
            source,
        })?;
        debug!(status, body = %body, "Expo push response");

        if status >= 400 {
            warn!(status, "Expo push rejected");
            return Err(classify_failure(status, &body));
        }

        // A 200 still carries per-message tickets that may report an error.
        match ticket_error(&body) {
            Some(detail) => Err(classify_failure(status, &detail)),
            None => Ok(()),
        }
    }
}

fn classify_failure(status: u16, detail: &str) -> PushError {
    if detail.contains(INVALID_TOKEN_MARKER) {
        PushError::InvalidToken {
            provider: PROVIDER,
            detail: INVALID_TOKEN_MARKER.to_string(),
        }
    } else if detail.contains(CREDENTIALS_MARKER) {
        PushError::Credentials {
            provider: PROVIDER,
            detail: detail.to_string(),
        }
    } else {
        PushError::Provider {
            provider: PROVIDER,
            status,
            detail: detail.to_string(),
        }
    }
}

/// Extract the first error ticket from a successful response body.
fn ticket_error(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let ticket = match parsed.get("data")? {
        Value::Array(tickets) => tickets.first()?.clone(),
        other => other.clone(),
    };
    if ticket.get("status").and_then(Value::as_str) != Some("error") {
        return None;
    }
    Some(ticket.to_string())
}

#[cfg(test)]
mod tests {
    use dochub_core::types::UserId;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TOKEN: &str = "ExponentPushToken[abcdefghijklmnop]";

    fn provider(server: &MockServer) -> ExpoProvider {
        ExpoProvider::new(&ExpoConfig {
            endpoint: format!("{}/--/api/v2/push/send", server.uri()),
            ..ExpoConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_expected_payload() {
        let server = MockServer::start().await;
        let user = UserId::new();
        Mock::given(method("POST"))
            .and(path("/--/api/v2/push/send"))
            .and(header("apns-push-type", "alert"))
            .and(body_partial_json(json!({
                "to": TOKEN,
                "title": "Notifikasi Baru",
                "body": "Dokumen masuk",
                "sound": "default",
                "data": {"user_id": user.to_string(), "type": "notification"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"status": "ok", "id": "ticket-1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let message = PushMessage::new(user, "Notifikasi Baru", "Dokumen masuk");
        provider(&server).send(TOKEN, &message).await.unwrap();
    }

    #[tokio::test]
    async fn test_device_not_registered_is_invalid_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{"code": "PUSH_TOO_MANY_EXPERIENCE_IDS", "details": {"error": "DeviceNotRegistered"}}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .send(TOKEN, &PushMessage::new(UserId::new(), "t", "b"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_token());
    }

    #[tokio::test]
    async fn test_error_ticket_on_200_is_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "status": "error",
                    "message": "not a registered push notification recipient",
                    "details": {"error": "DeviceNotRegistered"}
                }]
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .send(TOKEN, &PushMessage::new(UserId::new(), "t", "b"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_token());
    }

    #[tokio::test]
    async fn test_server_error_keeps_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .send(TOKEN, &PushMessage::new(UserId::new(), "t", "b"))
            .await
            .unwrap_err();
        assert!(!err.is_invalid_token());
        assert!(matches!(err, PushError::Provider { status: 503, .. }));
    }
}
