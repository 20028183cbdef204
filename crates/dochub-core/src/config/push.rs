//! External push provider configuration.

use serde::{Deserialize, Serialize};

/// Push delivery settings shared by all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Whether push delivery is attempted at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum push attempts running concurrently.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// How long shutdown waits for in-flight attempts, in seconds.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_seconds: u64,
    /// Title used for broadcast and direct notifications.
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Title used for role-targeted notifications.
    #[serde(default = "default_role_title")]
    pub role_title: String,
    /// Expo push service settings.
    #[serde(default)]
    pub expo: ExpoConfig,
    /// Firebase Cloud Messaging settings.
    #[serde(default)]
    pub fcm: FcmConfig,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_in_flight: default_max_in_flight(),
            drain_timeout_seconds: default_drain_timeout(),
            default_title: default_title(),
            role_title: default_role_title(),
            expo: ExpoConfig::default(),
            fcm: FcmConfig::default(),
        }
    }
}

/// Expo push API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpoConfig {
    /// Push send endpoint.
    #[serde(default = "default_expo_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_expo_timeout")]
    pub timeout_seconds: u64,
    /// Android notification channel.
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    /// Bundle identifier sent as the `apns-topic` header.
    #[serde(default)]
    pub apns_topic: Option<String>,
}

impl Default for ExpoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_expo_endpoint(),
            timeout_seconds: default_expo_timeout(),
            channel_id: default_channel_id(),
            apns_topic: None,
        }
    }
}

/// Firebase Cloud Messaging (HTTP v1) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    /// Whether FCM delivery is configured.
    #[serde(default)]
    pub enabled: bool,
    /// API base URL; the send path is appended.
    #[serde(default = "default_fcm_base_url")]
    pub base_url: String,
    /// Firebase project id. Taken from the service account when empty.
    #[serde(default)]
    pub project_id: String,
    /// Path to the service-account JSON key.
    #[serde(default)]
    pub service_account_path: Option<String>,
    /// Pre-issued OAuth access token, used instead of a service account.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Override for the OAuth token endpoint of the service account.
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_fcm_timeout")]
    pub timeout_seconds: u64,
    /// Android notification channel.
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    /// Android small icon resource.
    #[serde(default = "default_icon")]
    pub android_icon: String,
    /// Android accent color.
    #[serde(default = "default_color")]
    pub android_color: String,
    /// Android notification tag; replaces older notifications with the same tag.
    #[serde(default = "default_tag")]
    pub android_tag: String,
    /// Icon URL for web push.
    #[serde(default)]
    pub web_icon: Option<String>,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_fcm_base_url(),
            project_id: String::new(),
            service_account_path: None,
            access_token: None,
            token_uri: None,
            timeout_seconds: default_fcm_timeout(),
            channel_id: default_channel_id(),
            android_icon: default_icon(),
            android_color: default_color(),
            android_tag: default_tag(),
            web_icon: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_in_flight() -> usize {
    32
}

fn default_drain_timeout() -> u64 {
    20
}

fn default_title() -> String {
    "Notifikasi Baru".to_string()
}

fn default_role_title() -> String {
    "Notifikasi Admin".to_string()
}

fn default_expo_endpoint() -> String {
    "https://exp.host/--/api/v2/push/send".to_string()
}

fn default_expo_timeout() -> u64 {
    15
}

fn default_channel_id() -> String {
    "high-priority".to_string()
}

fn default_fcm_base_url() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_fcm_timeout() -> u64 {
    10
}

fn default_icon() -> String {
    "notification_icon".to_string()
}

fn default_color() -> String {
    "#125696".to_string()
}

fn default_tag() -> String {
    "dochub_notification".to_string()
}
