//! Device token shape classification.

use std::fmt;

/// Marker present in every Expo push token.
const EXPO_MARKER: &str = "ExponentPushToken";

/// FCM registration tokens are long opaque strings.
const FCM_MIN_LEN: usize = 100;

/// Provider inferred from a token's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Expo push token.
    Expo,
    /// Firebase Cloud Messaging registration token.
    Fcm,
    /// Neither shape matched; both providers are tried.
    Unknown,
}

impl TokenKind {
    /// Classify a stored token.
    pub fn classify(token: &str) -> Self {
        if token.contains(EXPO_MARKER) {
            Self::Expo
        } else if token.len() > FCM_MIN_LEN && !token.chars().any(char::is_whitespace) {
            Self::Fcm
        } else {
            Self::Unknown
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expo => "expo",
            Self::Fcm => "fcm",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shorten a token for logging.
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(30).collect();
    if prefix.len() < token.len() {
        format!("{prefix}...")
    } else {
        prefix
    }
}
