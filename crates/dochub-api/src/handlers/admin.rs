//! Admin dispatch and push provider check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use dochub_core::error::AppError;
use dochub_entity::activity::NewActivityLog;
use dochub_push::PushError;
use dochub_realtime::DispatchReport;

use crate::dto::request::{DispatchRequest, validate_body};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/admin/notifications/dispatch
///
/// Returns once every recipient's row is written and live events are
/// emitted. Push attempts continue in the background.
pub async fn dispatch_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DispatchRequest>,
) -> Result<Json<ApiResponse<DispatchReport>>, ApiError> {
    auth.require_admin()?;
    validate_body(&body)?;
    let audience = body.audience()?;

    let report = state
        .realtime
        .dispatcher
        .dispatch(&audience, &body.message, body.link())
        .await?;

    let entry = NewActivityLog {
        user_id: auth.id,
        user_name: auth.name.clone(),
        action: "notification_dispatch".to_string(),
        message: format!(
            "Sent notification to {audience} ({} of {} recipients)",
            report.persisted, report.targeted
        ),
    };
    if let Err(e) = state.stores.activity.record(entry).await {
        warn!(user_id = %auth.id, error = %e, "Failed to record activity log");
    }

    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/admin/notifications/push/check
///
/// Confirms the FCM credentials by minting (or reading) an access token.
/// Nothing is sent to any device.
pub async fn check_push_provider(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    auth.require_admin()?;

    match state.realtime.push.service().check_fcm().await {
        Ok(provider) => Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
            "{provider} connection successful"
        ))))),
        Err(PushError::NotConfigured { provider }) => {
            Err(AppError::conflict(format!("{provider} is not configured")).into())
        }
        Err(err) => {
            warn!(user_id = %auth.id, error = %err, "Push provider check failed");
            Err(AppError::from(err).into())
        }
    }
}
