//! User self-service handlers.

use axum::Json;
use axum::extract::State;
use tracing::info;

use dochub_core::error::AppError;
use dochub_push::token::{TokenKind, redact};

use crate::dto::request::{PushTokenRequest, validate_body};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/users/push-token
///
/// Replaces any token the caller registered before.
pub async fn store_push_token(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PushTokenRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_body(&body)?;
    let token = body.token.trim();
    if token.is_empty() {
        return Err(AppError::validation("Token is required").into());
    }

    state.stores.push_tokens.set_push_token(auth.id, token).await?;

    info!(
        user_id = %auth.id,
        kind = TokenKind::classify(token).as_str(),
        token = %redact(token),
        "Push token stored"
    );
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Push token stored successfully",
    ))))
}
