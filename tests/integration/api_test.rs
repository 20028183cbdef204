//! Integration tests for the notification, push-token, admin and health endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use dochub_core::types::UserId;
use dochub_entity::user::UserRole;

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/notifications", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_identity_is_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/notifications", None, Some(UserId::new()))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_is_paged_newest_first() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("Sari", UserRole::Staff).await;
    let other = app.create_user("Budi", UserRole::Staff).await;

    for age in 0..20 {
        app.create_notification(user.id, &format!("dokumen {age}"), age % 2 == 0, age)
            .await;
    }
    app.create_notification(other.id, "bukan milikmu", false, 0).await;

    let response = app
        .request("GET", "/api/notifications", None, Some(user.id))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 15);
    assert_eq!(items[0]["message"], "dokumen 0");
    assert_eq!(items[14]["message"], "dokumen 14");
    assert_eq!(data["unread_count"], 10);
    assert_eq!(data["has_more"], true);

    let response = app
        .request("GET", "/api/notifications?page=2&limit=15", None, Some(user.id))
        .await;
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(response.body["data"]["has_more"], false);
}

#[tokio::test]
async fn test_mark_read_only_own_rows() {
    let app = helpers::TestApp::new().await;
    let owner = app.create_user("Sari", UserRole::Staff).await;
    let stranger = app.create_user("Budi", UserRole::Staff).await;
    let row = app.create_notification(owner.id, "Surat masuk", false, 1).await;
    let path = format!("/api/notifications/{}/read", row.id);

    let response = app.request("POST", &path, None, Some(stranger.id)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("POST", &path, None, Some(owner.id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_read"], true);

    let stored = app.store.notifications().await;
    assert!(stored.iter().all(|n| n.is_read));
}

#[tokio::test]
async fn test_read_all_counts_only_unread() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("Sari", UserRole::Staff).await;
    for age in 0..7 {
        app.create_notification(user.id, "arsip", age < 2, age).await;
    }

    let response = app
        .request("POST", "/api/notifications/read-all", None, Some(user.id))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["updated_count"], 5);

    let response = app
        .request("POST", "/api/notifications/read-all", None, Some(user.id))
        .await;
    assert_eq!(response.body["data"]["updated_count"], 0);
}

#[tokio::test]
async fn test_push_token_rejects_empty_and_replaces() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("Sari", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/users/push-token",
            Some(json!({ "token": "" })),
            Some(user.id),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    for token in ["ExponentPushToken[first]", "ExponentPushToken[second]"] {
        let response = app
            .request(
                "POST",
                "/api/users/push-token",
                Some(json!({ "token": token })),
                Some(user.id),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let stored = app.store.user(user.id).await.unwrap();
    assert_eq!(stored.push_token.as_deref(), Some("ExponentPushToken[second]"));
}

#[tokio::test]
async fn test_dispatch_requires_admin() {
    let app = helpers::TestApp::new().await;
    let staff = app.create_user("Sari", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/admin/notifications/dispatch",
            Some(json!({ "target": "all", "message": "Halo" })),
            Some(staff.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(app.store.notifications().await.is_empty());
}

#[tokio::test]
async fn test_dispatch_to_admin_roles() {
    let app = helpers::TestApp::new().await;
    let admin = app.create_user("Rina", UserRole::Admin).await;
    let superadmin = app.create_user("Joko", UserRole::Superadmin).await;
    let staff = app.create_user("Sari", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/admin/notifications/dispatch",
            Some(json!({
                "target": "roles",
                "message": "Dokumen staf baru menunggu verifikasi",
                "link": "/staff-documents",
            })),
            Some(admin.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["targeted"], 2);
    assert_eq!(response.body["data"]["persisted"], 2);
    assert_eq!(response.body["data"]["push_spawned"], 0);

    let rows = app.store.notifications().await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|n| n.user_id != staff.id));
    assert!(rows.iter().any(|n| n.user_id == superadmin.id));
    assert!(rows.iter().all(|n| n.link.as_deref() == Some("/staff-documents")));

    let logs = app.store.activity_logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_id, admin.id);
    assert_eq!(logs[0].action, "notification_dispatch");
}

#[tokio::test]
async fn test_dispatch_to_user_requires_user_id() {
    let app = helpers::TestApp::new().await;
    let admin = app.create_user("Rina", UserRole::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/admin/notifications/dispatch",
            Some(json!({ "target": "user", "message": "Halo" })),
            Some(admin.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dispatch_to_missing_user_is_empty() {
    let app = helpers::TestApp::new().await;
    let admin = app.create_user("Rina", UserRole::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/admin/notifications/dispatch",
            Some(json!({
                "target": "user",
                "user_id": UserId::new(),
                "message": "Halo",
            })),
            Some(admin.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["targeted"], 0);
    assert!(app.store.notifications().await.is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["live_connections"], 0);
}
