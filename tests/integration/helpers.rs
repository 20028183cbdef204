//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tower::ServiceExt;

use dochub_api::AppState;
use dochub_core::config::{AppConfig, PushConfig};
use dochub_core::types::UserId;
use dochub_database::{MemoryStore, Stores};
use dochub_entity::notification::{NewNotification, Notification};
use dochub_entity::user::{User, UserRole};
use dochub_push::PushService;
use dochub_realtime::RealtimeEngine;

/// Test application context backed by the in-memory store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Direct access to stored rows
    pub store: MemoryStore,
    /// Shared state behind the router
    pub state: AppState,
    shutdown: watch::Sender<bool>,
}

impl TestApp {
    /// Create a new test application with push delivery disabled.
    pub async fn new() -> Self {
        Self::with_push(PushConfig {
            enabled: false,
            ..PushConfig::default()
        })
        .await
    }

    /// Create a test application with the given push settings.
    pub async fn with_push(push: PushConfig) -> Self {
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.push = push;

        let store = MemoryStore::new();
        let stores = Stores::memory(store.clone());
        let push = PushService::from_config(&config.push, stores.push_tokens.clone())
            .expect("Failed to build push service");

        let (shutdown, shutdown_rx) = watch::channel(false);
        let realtime = RealtimeEngine::start(
            &config.realtime,
            &config.push,
            &stores,
            push,
            shutdown_rx,
        );

        let state = AppState::new(Arc::new(config), stores, realtime);
        let router = dochub_api::build_app(state.clone());

        Self {
            router,
            store,
            state,
            shutdown,
        }
    }

    /// Insert a user with the given role.
    pub async fn create_user(&self, name: &str, role: UserRole) -> User {
        let user = User::new(name, name.to_lowercase(), role);
        self.store.insert_user(user.clone()).await;
        user
    }

    /// Insert a notification for `user`, created `age_minutes` ago.
    pub async fn create_notification(
        &self,
        user: UserId,
        message: &str,
        is_read: bool,
        age_minutes: i64,
    ) -> Notification {
        let created = Utc::now() - ChronoDuration::minutes(age_minutes);
        let mut row = Notification::from_new(NewNotification::new(user, message, None), created);
        row.is_read = is_read;
        self.store.insert_notification(row.clone()).await;
        row
    }

    /// Make a request as `user` (or anonymously).
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<UserId>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req.header("X-User-Id", user.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the router on an ephemeral local port.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Test server failed");
        });
        addr
    }

    /// Wait until `user` has exactly `expected` live connections.
    pub async fn wait_for_connections(&self, user: UserId, expected: usize) {
        for _ in 0..200 {
            if self.state.realtime.hub.user_connection_count(user).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("user {user} never reached {expected} live connections");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
