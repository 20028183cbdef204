//! Route definitions for the DocHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket endpoint lives at
//! `/ws`.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route and the shared state.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(user_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Inbox: list, mark one read, mark all read
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/read-all",
            post(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            post(handlers::notification::mark_read),
        )
}

/// Push token registration
fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/push-token",
        post(handlers::user::store_push_token),
    )
}

/// Admin-only dispatch and push provider check
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/notifications/dispatch",
            post(handlers::admin::dispatch_notification),
        )
        .route(
            "/admin/notifications/push/check",
            post(handlers::admin::check_push_provider),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
