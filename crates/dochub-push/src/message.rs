//! Provider-independent push payload.

use dochub_core::types::UserId;

/// Title and body delivered to one user's device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    /// Recipient, echoed in the payload's data section.
    pub user_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}

impl PushMessage {
    /// Create a push message.
    pub fn new(user_id: UserId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            body: body.into(),
        }
    }
}
