//! End-to-end tests for live delivery over a real WebSocket.

mod helpers;

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use dochub_core::types::UserId;
use dochub_entity::user::UserRole;
use dochub_realtime::Audience;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect_with_header(addr: std::net::SocketAddr, user: UserId) -> Client {
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert("x-user-id", user.to_string().parse().unwrap());
    let (client, _) = connect_async(request).await.expect("WebSocket connect failed");
    client
}

async fn next_event(client: &mut Client) -> Value {
    let deadline = Duration::from_secs(2);
    loop {
        let frame = tokio::time::timeout(deadline, client.next())
            .await
            .expect("no event within deadline")
            .expect("stream ended")
            .expect("read failed");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_dispatch_reaches_live_connection() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("Sari", UserRole::Staff).await;
    let addr = app.serve().await;

    let mut client = connect_with_header(addr, user.id).await;
    app.wait_for_connections(user.id, 1).await;

    let report = app
        .state
        .realtime
        .dispatcher
        .dispatch(&Audience::SpecificUser(user.id), "Dokumen baru", None)
        .await
        .unwrap();
    assert_eq!(report.persisted, 1);

    let event = next_event(&mut client).await;
    assert_eq!(event["type"], "notification_added");
    assert_eq!(event["message"], "new_notification");
    assert_eq!(event["user_id"], user.id.to_string());
}

#[tokio::test]
async fn test_every_connection_of_user_receives() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("Sari", UserRole::Staff).await;
    let bystander = app.create_user("Budi", UserRole::Staff).await;
    let addr = app.serve().await;

    let mut phone = connect_with_header(addr, user.id).await;
    let mut browser = connect_with_header(addr, user.id).await;
    let mut other = connect_with_header(addr, bystander.id).await;
    app.wait_for_connections(user.id, 2).await;
    app.wait_for_connections(bystander.id, 1).await;

    app.state
        .realtime
        .dispatcher
        .dispatch(&Audience::SpecificUser(user.id), "Rapat jam 9", None)
        .await
        .unwrap();

    assert_eq!(next_event(&mut phone).await["type"], "notification_added");
    assert_eq!(next_event(&mut browser).await["type"], "notification_added");

    let silent = tokio::time::timeout(Duration::from_millis(200), other.next()).await;
    assert!(silent.is_err(), "bystander must not receive the event");
}

#[tokio::test]
async fn test_query_parameter_fallback() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("Sari", UserRole::Staff).await;
    let addr = app.serve().await;

    let url = format!("ws://{addr}/ws?user_id={}", user.id);
    let (_client, _) = connect_async(url).await.expect("WebSocket connect failed");

    app.wait_for_connections(user.id, 1).await;
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let app = helpers::TestApp::new().await;
    let addr = app.serve().await;

    let url = format!("ws://{addr}/ws?user_id={}", UserId::new());
    match connect_async(url).await {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 401);
        }
        Err(e) => panic!("expected HTTP 401, got {e}"),
        Ok(_) => panic!("upgrade should have been rejected"),
    }
}

#[tokio::test]
async fn test_close_unregisters_connection() {
    let app = helpers::TestApp::new().await;
    let user = app.create_user("Sari", UserRole::Staff).await;
    let addr = app.serve().await;

    let mut client = connect_with_header(addr, user.id).await;
    app.wait_for_connections(user.id, 1).await;

    client.send(Message::Close(None)).await.unwrap();
    drop(client);

    app.wait_for_connections(user.id, 0).await;
    assert_eq!(app.state.realtime.hub.connection_count().await, 0);
}
