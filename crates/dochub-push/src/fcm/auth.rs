//! OAuth access tokens for the FCM HTTP v1 API.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use dochub_core::error::{AppError, ErrorKind};

use crate::error::PushError;

const PROVIDER: &str = "fcm";
const SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertions are valid for one hour.
const ASSERTION_TTL_SECONDS: i64 = 3600;

/// Refresh cached tokens this long before they expire.
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// The fields of a Google service-account key file that are used.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Firebase project id.
    pub project_id: String,
    /// Service account email, the JWT issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth token endpoint.
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to read service account file {}", path.display()),
                e,
            )
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid service account file {}", path.display()),
                e,
            )
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'static str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Source of bearer tokens for FCM requests.
pub enum FcmAuth {
    /// A pre-issued access token, used as-is.
    Static(String),
    /// Tokens minted from a service-account key and cached until near expiry.
    ServiceAccount(ServiceAccountAuth),
}

impl std::fmt::Debug for FcmAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("FcmAuth::Static(..)"),
            Self::ServiceAccount(account) => std::fmt::Debug::fmt(account, f),
        }
    }
}

/// Service-account signer plus the last token it minted.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.key.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl FcmAuth {
    /// Service-account auth; `token_uri` overrides the one in the key file.
    pub fn service_account(
        key: ServiceAccountKey,
        token_uri: Option<String>,
    ) -> Result<Self, AppError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "Service account private key is not a valid RSA PEM",
                e,
            )
        })?;
        let token_uri = token_uri.unwrap_or_else(|| key.token_uri.clone());
        info!(client_email = %key.client_email, "FCM service account loaded");
        Ok(Self::ServiceAccount(ServiceAccountAuth {
            key,
            signing_key,
            token_uri,
            cached: Mutex::new(None),
        }))
    }

    /// Return a bearer token, minting a new one if needed.
    pub async fn access_token(&self, client: &reqwest::Client) -> Result<String, PushError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ServiceAccount(account) => account.access_token(client).await,
        }
    }

    /// Forget a cached token after the API rejected it.
    pub async fn invalidate(&self) {
        if let Self::ServiceAccount(account) = self {
            account.cached.lock().await.take();
        }
    }
}

impl ServiceAccountAuth {
    async fn access_token(&self, client: &reqwest::Client) -> Result<String, PushError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECONDS) > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = mint(client, &self.key, &self.signing_key, &self.token_uri, now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

async fn mint(
    client: &reqwest::Client,
    key: &ServiceAccountKey,
    signing_key: &EncodingKey,
    token_uri: &str,
    now: DateTime<Utc>,
) -> Result<CachedToken, PushError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_TTL_SECONDS,
    };
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, signing_key).map_err(|e| {
        PushError::Credentials {
            provider: PROVIDER,
            detail: format!("Failed to sign assertion: {e}"),
        }
    })?;

    let response = client
        .post(token_uri)
        .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|source| PushError::Transport {
            provider: PROVIDER,
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PushError::Credentials {
            provider: PROVIDER,
            detail: format!("Token endpoint returned {status}: {body}"),
        });
    }

    let token: TokenResponse = response.json().await.map_err(|source| PushError::Transport {
        provider: PROVIDER,
        source,
    })?;
    debug!(expires_in = token.expires_in, "Minted FCM access token");

    Ok(CachedToken {
        value: token.access_token,
        expires_at: now + Duration::seconds(token.expires_in),
    })
}
