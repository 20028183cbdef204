//! `AuthUser` extractor: resolves the upstream identity claim to a user.
//!
//! An auth layer in front of this service validates the caller and forwards
//! their id in the `X-User-Id` header. The claim is trusted as-is and only
//! checked against the user directory.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::UserId;
use dochub_entity::user::User;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the pre-validated caller id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The calling user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    /// Fail with an authorization error unless the caller is an admin or superadmin.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Admin role required"))
        }
    }
}

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claim = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing X-User-Id header"))?;

        let user = resolve_claim(state, claim).await?;
        Ok(AuthUser(user))
    }
}

/// Parse a raw identity claim and look the user up.
pub async fn resolve_claim(state: &AppState, claim: &str) -> AppResult<User> {
    let user_id: UserId = claim
        .parse()
        .map_err(|_| AppError::authentication("Malformed user id claim"))?;

    state
        .stores
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::authentication("Unknown user"))
}
