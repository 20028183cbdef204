//! Live event payload.

use dochub_core::types::UserId;
use serde::{Deserialize, Serialize};

/// Value of the `message` field for new-notification events.
pub const NEW_NOTIFICATION: &str = "new_notification";

/// Kind of state change announced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A notification row was persisted for the user.
    NotificationAdded,
}

/// One JSON object written to each of the target user's connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    /// Target user.
    pub user_id: UserId,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Short message for the client.
    pub message: String,
}

impl LiveEvent {
    /// The event emitted after a notification row is persisted.
    pub fn notification_added(user_id: UserId) -> Self {
        Self {
            user_id,
            kind: EventKind::NotificationAdded,
            message: NEW_NOTIFICATION.to_string(),
        }
    }
}
