//! # dochub-api
//!
//! HTTP API layer for DocHub built on Axum.
//!
//! Serves the WebSocket endpoint that feeds the live connection registry,
//! the notification inbox endpoints, push token registration, the admin
//! dispatch endpoint and health.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
