//! Notification inbox handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use dochub_core::types::NotificationId;
use dochub_entity::notification::{Notification, NotificationPage};

use crate::dto::response::{ApiResponse, UpdatedCountResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<NotificationPage>>, ApiError> {
    let (page, limit) = params.normalized();
    let result = state
        .stores
        .notifications
        .list_for_user(auth.id, page, limit)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let row = state.stores.notifications.mark_read(id, auth.id).await?;
    Ok(Json(ApiResponse::ok(row)))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UpdatedCountResponse>>, ApiError> {
    let updated_count = state.stores.notifications.mark_all_read(auth.id).await?;
    tracing::debug!(user_id = %auth.id, updated_count, "Marked all notifications read");
    Ok(Json(ApiResponse::ok(UpdatedCountResponse { updated_count })))
}
