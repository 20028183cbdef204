//! Activity log entry model.

use chrono::{DateTime, Utc};
use dochub_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable record of a user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The acting user.
    pub user_id: UserId,
    /// The acting user's display name at the time of the action.
    pub user_name: String,
    /// Short action code (e.g. `"notification.dispatch"`).
    pub action: String,
    /// Human-readable description.
    pub message: String,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to record an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivityLog {
    /// The acting user.
    pub user_id: UserId,
    /// The acting user's display name.
    pub user_name: String,
    /// Short action code.
    pub action: String,
    /// Human-readable description.
    pub message: String,
}

impl ActivityLog {
    /// Build an entry for `new`, stamped at `now`.
    pub fn from_new(new: NewActivityLog, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            user_name: new.user_name,
            action: new.action,
            message: new.message,
            created_at: now,
        }
    }
}
