//! WebSocket upgrade handler and per-connection lifecycle.
//!
//! Each connection runs two tasks: a writer pump draining the connection's
//! outbound queue (plus periodic pings) and a read loop that watches for
//! close or error. Whichever finishes first ends the connection, and the
//! [`ConnectionGuard`] unregisters it exactly once.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at, timeout};
use tracing::{debug, info, warn};

use dochub_core::config::RealtimeConfig;
use dochub_core::error::AppError;
use dochub_core::types::{ConnectionId, UserId};
use dochub_realtime::{ConnectionGuard, LiveConnection};

use crate::error::ApiError;
use crate::extractors::{USER_ID_HEADER, resolve_claim};
use crate::state::AppState;

/// Query parameters accepted on upgrade.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Fallback identity claim for clients that cannot set headers.
    pub user_id: Option<String>,
}

/// Where the identity claim came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimSource {
    /// The upstream auth header.
    Header,
    /// The unauthenticated query parameter.
    Query,
}

/// Pick the identity claim: the header wins over the query parameter.
pub fn select_claim<'a>(
    headers: &'a HeaderMap,
    query: &'a WsQuery,
) -> Option<(&'a str, ClaimSource)> {
    let header = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(claim) = header {
        return Some((claim, ClaimSource::Header));
    }
    query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|claim| (claim, ClaimSource::Query))
}

/// GET /ws: WebSocket upgrade
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let (claim, source) = select_claim(&headers, &query)
        .ok_or_else(|| AppError::authentication("Missing user id claim"))?;

    let user = resolve_claim(&state, claim).await?;
    if source == ClaimSource::Query {
        warn!(
            user_id = %user.id,
            "WebSocket identity taken from query parameter, claim is unauthenticated"
        );
    }

    let user_id = user.id;
    Ok(ws.on_upgrade(move |socket| handle_connection(state, user_id, socket)))
}

/// Run one connection from registration to cleanup.
async fn handle_connection(state: AppState, user_id: UserId, socket: WebSocket) {
    let config = state.realtime.config().clone();
    let hub = state.realtime.hub.clone();

    let (conn, outbound) = LiveConnection::channel(user_id, config.connection_buffer_size);
    let conn_id = conn.id;
    hub.register(conn);
    let guard = ConnectionGuard::new(hub, user_id, conn_id);

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection established");

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_pump(sink, outbound, config, conn_id));
    let mut reader = tokio::spawn(read_loop(stream, conn_id));

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    guard.release();
    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}

/// Forward queued frames and send pings until the queue closes or a write
/// fails or times out.
async fn write_pump(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    config: RealtimeConfig,
    conn_id: ConnectionId,
) {
    let ping_every = Duration::from_secs(config.ping_interval_seconds.max(1));
    let write_timeout = Duration::from_millis(config.write_timeout_ms.max(1));
    let mut ping = interval_at(Instant::now() + ping_every, ping_every);

    loop {
        let msg = tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => Message::Text(text.into()),
                None => break,
            },
            _ = ping.tick() => Message::Ping(Default::default()),
        };

        match timeout(write_timeout, sink.send(msg)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket write failed");
                break;
            }
            Err(_) => {
                warn!(
                    conn_id = %conn_id,
                    timeout_ms = config.write_timeout_ms,
                    "WebSocket write timed out"
                );
                break;
            }
        }
    }

    let _ = sink.close().await;
}

/// Consume inbound frames until the peer closes or the transport fails.
///
/// Clients do not send commands; inbound text is ignored.
async fn read_loop(mut stream: SplitStream<WebSocket>, conn_id: ConnectionId) {
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }
}
