//! Application builder: router plus global layers.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Build the complete application with CORS and request tracing.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
