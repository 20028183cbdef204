//! Integration tests for the admin push provider check.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dochub_core::config::{FcmConfig, PushConfig};
use dochub_entity::user::UserRole;

const CHECK_PATH: &str = "/api/admin/notifications/push/check";

fn fcm_push_config(server: &MockServer) -> PushConfig {
    PushConfig {
        enabled: false,
        fcm: FcmConfig {
            enabled: true,
            base_url: server.uri(),
            service_account_path: Some(
                concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/crates/dochub-push/testdata/service_account.json"
                )
                .to_string(),
            ),
            token_uri: Some(format!("{}/token", server.uri())),
            ..FcmConfig::default()
        },
        ..PushConfig::default()
    }
}

#[tokio::test]
async fn test_check_succeeds_when_token_is_minted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "ya29.ok", "expires_in": 3599})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = helpers::TestApp::with_push(fcm_push_config(&server)).await;
    let admin = app.create_user("Rina", UserRole::Admin).await;

    let response = app.request("POST", CHECK_PATH, None, Some(admin.id)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["message"], "fcm connection successful");
}

#[tokio::test]
async fn test_check_reports_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;
    let app = helpers::TestApp::with_push(fcm_push_config(&server)).await;
    let admin = app.create_user("Rina", UserRole::Superadmin).await;

    let response = app.request("POST", CHECK_PATH, None, Some(admin.id)).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "EXTERNAL_SERVICE_ERROR");
}

#[tokio::test]
async fn test_check_without_fcm_is_conflict() {
    let app = helpers::TestApp::new().await;
    let admin = app.create_user("Rina", UserRole::Admin).await;

    let response = app.request("POST", CHECK_PATH, None, Some(admin.id)).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_check_requires_admin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = helpers::TestApp::with_push(fcm_push_config(&server)).await;
    let staff = app.create_user("Sari", UserRole::Staff).await;

    let response = app.request("POST", CHECK_PATH, None, Some(staff.id)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
