//! Token-shape dispatch and self-healing token cleanup.

use std::sync::Arc;

use tracing::{debug, info, warn};

use dochub_core::config::PushConfig;
use dochub_core::result::AppResult;
use dochub_database::store::PushTokenStore;

use crate::error::PushError;
use crate::expo::ExpoProvider;
use crate::fcm::FcmProvider;
use crate::message::PushMessage;
use crate::provider::PushProvider;
use crate::token::{TokenKind, redact};

/// Result of a push attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The user has no usable token; nothing was sent.
    NoToken,
    /// Push delivery is switched off.
    Disabled,
    /// A provider accepted the message.
    Delivered {
        /// Provider that accepted it.
        provider: &'static str,
    },
    /// The provider condemned the token and it was cleared.
    TokenCleared {
        /// Provider that rejected it.
        provider: &'static str,
    },
}

/// Routes a push to the provider matching the stored token.
#[derive(Debug, Clone)]
pub struct PushService {
    enabled: bool,
    expo: Arc<dyn PushProvider>,
    fcm: Option<Arc<dyn PushProvider>>,
    tokens: Arc<dyn PushTokenStore>,
}

impl PushService {
    /// Build the service and its providers from configuration.
    pub fn from_config(config: &PushConfig, tokens: Arc<dyn PushTokenStore>) -> AppResult<Self> {
        let expo: Arc<dyn PushProvider> = Arc::new(ExpoProvider::new(&config.expo)?);
        let fcm = FcmProvider::from_config(&config.fcm)?
            .map(|p| Arc::new(p) as Arc<dyn PushProvider>);
        if fcm.is_none() {
            info!("FCM disabled; FCM-shaped tokens will not be delivered");
        }
        Ok(Self::new(config.enabled, expo, fcm, tokens))
    }

    /// Build the service from explicit providers.
    pub fn new(
        enabled: bool,
        expo: Arc<dyn PushProvider>,
        fcm: Option<Arc<dyn PushProvider>>,
        tokens: Arc<dyn PushTokenStore>,
    ) -> Self {
        Self {
            enabled,
            expo,
            fcm,
            tokens,
        }
    }

    /// Whether push attempts are made at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Deliver `message` to the device behind `token`.
    ///
    /// A missing or blank token is a successful no-op. A token any provider
    /// reports as permanently invalid is cleared, unless a fallback provider
    /// then delivers. Other failures are returned and leave the token in place.
    pub async fn deliver(
        &self,
        token: Option<&str>,
        message: &PushMessage,
    ) -> Result<PushOutcome, PushError> {
        if !self.enabled {
            return Ok(PushOutcome::Disabled);
        }
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            debug!(user_id = %message.user_id, "No push token, skipping");
            return Ok(PushOutcome::NoToken);
        };

        let kind = TokenKind::classify(token);
        debug!(user_id = %message.user_id, kind = %kind, token = %redact(token), "Sending push");

        // Set when an earlier attempt condemned the token but a fallback still ran.
        let mut condemned_by = None;
        let result = match kind {
            TokenKind::Expo => self.expo.send(token, message).await.map(|()| self.expo.name()),
            TokenKind::Fcm => self.send_fcm(token, message).await,
            TokenKind::Unknown => match self.expo.send(token, message).await {
                Ok(()) => Ok(self.expo.name()),
                Err(err) if self.fcm.is_some() => {
                    if err.is_invalid_token() {
                        condemned_by = Some(err.provider());
                    }
                    warn!(user_id = %message.user_id, error = %err, "Expo attempt failed, trying FCM");
                    self.send_fcm(token, message).await
                }
                Err(err) => Err(err),
            },
        };

        let err = match result {
            Ok(provider) => {
                info!(user_id = %message.user_id, provider, "Push delivered");
                return Ok(PushOutcome::Delivered { provider });
            }
            Err(err) => err,
        };

        let condemned_by = if err.is_invalid_token() {
            Some(err.provider())
        } else {
            condemned_by
        };
        let Some(provider) = condemned_by else {
            return Err(err);
        };

        warn!(user_id = %message.user_id, provider, "Push token rejected, clearing it");
        if let Err(e) = self.tokens.clear_push_token(message.user_id).await {
            warn!(user_id = %message.user_id, error = %e, "Failed to clear push token");
            return Err(err);
        }
        Ok(PushOutcome::TokenCleared { provider })
    }

    /// Verify the FCM credentials by minting or reading an access token.
    ///
    /// Returns `NotConfigured` when FCM is disabled.
    pub async fn check_fcm(&self) -> Result<&'static str, PushError> {
        let Some(fcm) = &self.fcm else {
            return Err(PushError::NotConfigured { provider: "fcm" });
        };
        fcm.check().await?;
        Ok(fcm.name())
    }

    async fn send_fcm(&self, token: &str, message: &PushMessage) -> Result<&'static str, PushError> {
        match &self.fcm {
            Some(fcm) => fcm.send(token, message).await.map(|()| fcm.name()),
            None => Err(PushError::NotConfigured { provider: "fcm" }),
        }
    }
}
