//! Push delivery errors.

use dochub_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Failure of a single push attempt.
#[derive(Debug, Error)]
pub enum PushError {
    /// The provider reported the device token as permanently invalid.
    #[error("{provider}: device token rejected: {detail}")]
    InvalidToken {
        /// Provider name.
        provider: &'static str,
        /// Provider error signature.
        detail: String,
    },

    /// The request never produced a usable response (timeout, connection reset).
    #[error("{provider}: transport error: {source}")]
    Transport {
        /// Provider name.
        provider: &'static str,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with an error that does not condemn the token.
    #[error("{provider}: provider error (status {status}): {detail}")]
    Provider {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        detail: String,
    },

    /// Our own credentials were rejected or could not be produced.
    #[error("{provider}: credentials error: {detail}")]
    Credentials {
        /// Provider name.
        provider: &'static str,
        /// What went wrong.
        detail: String,
    },

    /// No provider is configured for this token type.
    #[error("{provider}: provider not configured")]
    NotConfigured {
        /// Provider name.
        provider: &'static str,
    },
}

impl PushError {
    /// Whether this failure means the token must be cleared.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Self::InvalidToken { .. })
    }

    /// Name of the provider the attempt was made against.
    pub fn provider(&self) -> &'static str {
        match self {
            Self::InvalidToken { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Provider { provider, .. }
            | Self::Credentials { provider, .. }
            | Self::NotConfigured { provider } => provider,
        }
    }
}

impl From<PushError> for AppError {
    fn from(err: PushError) -> Self {
        AppError::with_source(ErrorKind::ExternalService, err.to_string(), err)
    }
}
