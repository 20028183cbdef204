//! Send side of one live connection.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use dochub_core::types::{ConnectionId, UserId};

/// Result of a non-blocking send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Queued for the writer.
    Sent,
    /// The outbound buffer is full; the frame was dropped.
    Full,
    /// The writer has gone away.
    Closed,
}

/// A registered connection as the hub sees it.
///
/// Holds the sending half of the connection's bounded outbound queue. The
/// receiving half belongs to the connection's writer task.
#[derive(Debug, Clone)]
pub struct LiveConnection {
    /// Unique connection id.
    pub id: ConnectionId,
    /// Owning user.
    pub user_id: UserId,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
}

impl LiveConnection {
    /// Create a connection and the receiver its writer drains.
    pub fn channel(user_id: UserId, buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let conn = Self {
            id: ConnectionId::new(),
            user_id,
            connected_at: Utc::now(),
            sender,
        };
        (conn, receiver)
    }

    /// Queue a frame without waiting.
    pub fn send(&self, frame: String) -> SendStatus {
        match self.sender.try_send(frame) {
            Ok(()) => SendStatus::Sent,
            Err(mpsc::error::TrySendError::Full(_)) => SendStatus::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => SendStatus::Closed,
        }
    }
}
