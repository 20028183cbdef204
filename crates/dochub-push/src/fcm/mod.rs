//! Firebase Cloud Messaging (HTTP v1) provider.

pub mod auth;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use dochub_core::config::FcmConfig;
use dochub_core::error::{AppError, ErrorKind};

use crate::error::PushError;
use crate::message::PushMessage;
use crate::provider::PushProvider;

pub use auth::{FcmAuth, ServiceAccountAuth, ServiceAccountKey};

const PROVIDER: &str = "fcm";

/// Error signatures FCM uses for registration tokens that will never work again.
const INVALID_TOKEN_MARKERS: [&str; 4] = [
    "unregistered",
    "registration-token-not-registered",
    "invalid-registration-token",
    "not a valid fcm registration token",
];

/// Sends through `projects/{id}/messages:send`.
#[derive(Debug)]
pub struct FcmProvider {
    client: reqwest::Client,
    send_url: String,
    auth: FcmAuth,
    channel_id: String,
    android_icon: String,
    android_color: String,
    android_tag: String,
    web_icon: Option<String>,
}

impl FcmProvider {
    /// Build a provider from configuration.
    ///
    /// Prefers a service-account key file and falls back to a static access
    /// token. Returns `None` when FCM is disabled.
    pub fn from_config(config: &FcmConfig) -> Result<Option<Self>, AppError> {
        if !config.enabled {
            return Ok(None);
        }

        let (auth, project_id) = match (&config.service_account_path, &config.access_token) {
            (Some(path), _) => {
                let key = ServiceAccountKey::from_file(path)?;
                let project_id = if config.project_id.is_empty() {
                    key.project_id.clone()
                } else {
                    config.project_id.clone()
                };
                (FcmAuth::service_account(key, config.token_uri.clone())?, project_id)
            }
            (None, Some(token)) => (FcmAuth::Static(token.clone()), config.project_id.clone()),
            (None, None) => {
                return Err(AppError::configuration(
                    "FCM is enabled but neither service_account_path nor access_token is set",
                ));
            }
        };

        if project_id.is_empty() {
            return Err(AppError::configuration("FCM project_id is not set"));
        }

        info!(project_id = %project_id, "FCM provider configured");
        Self::new(config, auth, &project_id).map(Some)
    }

    /// Build a provider with explicit credentials.
    pub fn new(config: &FcmConfig, auth: FcmAuth, project_id: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build FCM client", e)
            })?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/v1/projects/{project_id}/messages:send",
                config.base_url.trim_end_matches('/')
            ),
            auth,
            channel_id: config.channel_id.clone(),
            android_icon: config.android_icon.clone(),
            android_color: config.android_color.clone(),
            android_tag: config.android_tag.clone(),
            web_icon: config.web_icon.clone(),
        })
    }

    fn build_message(&self, token: &str, message: &PushMessage) -> Value {
        let mut webpush = json!({
            "notification": {"title": message.title, "body": message.body}
        });
        if let Some(icon) = &self.web_icon {
            webpush["notification"]["icon"] = json!(icon);
        }

        json!({
            "message": {
                "token": token,
                "notification": {"title": message.title, "body": message.body},
                "data": {
                    "user_id": message.user_id.to_string(),
                    "type": "notification",
                    "click_action": "FLUTTER_NOTIFICATION_CLICK"
                },
                "android": {
                    "priority": "high",
                    "notification": {
                        "channel_id": self.channel_id,
                        "sound": "default",
                        "icon": self.android_icon,
                        "color": self.android_color,
                        "click_action": "OPEN_APP",
                        "tag": self.android_tag
                    }
                },
                "apns": {
                    "headers": {"apns-priority": "10"},
                    "payload": {
                        "aps": {
                            "alert": {"title": message.title, "body": message.body},
                            "sound": "default",
                            "badge": 1
                        }
                    }
                },
                "webpush": webpush
            }
        })
    }
}

#[async_trait]
impl PushProvider for FcmProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        let bearer = self.auth.access_token(&self.client).await?;
        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(bearer)
            .json(&self.build_message(token, message))
            .send()
            .await
            .map_err(|source| PushError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| PushError::Transport {
            provider: PROVIDER,
            source,
        })?;
        debug!(status, body = %body, "FCM send response");

        if status < 400 {
            return Ok(());
        }
        warn!(status, "FCM send rejected");

        if is_invalid_token_response(&body) {
            return Err(PushError::InvalidToken {
                provider: PROVIDER,
                detail: body,
            });
        }
        if status == 401 || status == 403 {
            self.auth.invalidate().await;
            return Err(PushError::Credentials {
                provider: PROVIDER,
                detail: body,
            });
        }
        Err(PushError::Provider {
            provider: PROVIDER,
            status,
            detail: body,
        })
    }

    async fn check(&self) -> Result<(), PushError> {
        self.auth.access_token(&self.client).await?;
        info!("FCM credentials accepted");
        Ok(())
    }
}

fn is_invalid_token_response(body: &str) -> bool {
    let lowered = body.to_lowercase();
    INVALID_TOKEN_MARKERS.iter().any(|m| lowered.contains(m))
}
