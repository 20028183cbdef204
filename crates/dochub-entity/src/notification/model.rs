//! Notification entity model.

use chrono::{DateTime, Utc};
use dochub_core::types::{NotificationId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One message delivered to one user.
///
/// A broadcast to N users produces N independent rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient.
    pub user_id: UserId,
    /// Message text.
    pub message: String,
    /// Optional deep link into the client application.
    pub link: Option<String>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Build an unread row for `new`, stamped at `now`.
    pub fn from_new(new: NewNotification, now: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            user_id: new.user_id,
            message: new.message,
            link: new.link,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Data required to persist a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    /// The recipient.
    pub user_id: UserId,
    /// Message text.
    pub message: String,
    /// Optional deep link.
    pub link: Option<String>,
}

impl NewNotification {
    /// Create a notification request for one recipient.
    pub fn new(user_id: UserId, message: impl Into<String>, link: Option<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            link,
        }
    }
}

/// One page of a user's notifications, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    /// Rows on this page.
    pub items: Vec<Notification>,
    /// Unread rows across all pages.
    pub unread_count: i64,
    /// Whether another page may follow.
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_new_starts_unread() {
        let user = UserId::new();
        let now = Utc::now();
        let row = Notification::from_new(
            NewNotification::new(user, "Dokumen baru", Some("/documents/1".into())),
            now,
        );
        assert_eq!(row.user_id, user);
        assert!(!row.is_read);
        assert_eq!(row.created_at, row.updated_at);
        assert_eq!(row.link.as_deref(), Some("/documents/1"));
    }
}
