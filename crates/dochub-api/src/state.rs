//! Application state shared across all handlers.

use std::sync::Arc;

use dochub_core::config::AppConfig;
use dochub_database::Stores;
use dochub_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Persistence ──────────────────────────────────────────
    /// Users, notifications, push tokens and activity log
    pub stores: Stores,

    // ── Real-time ────────────────────────────────────────────
    /// Connection registry, dispatcher and push supervisor
    pub realtime: RealtimeEngine,
}

impl AppState {
    /// Bundle the shared dependencies.
    pub fn new(config: Arc<AppConfig>, stores: Stores, realtime: RealtimeEngine) -> Self {
        Self {
            config,
            stores,
            realtime,
        }
    }
}
