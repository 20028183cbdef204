//! User entity model.

use chrono::{DateTime, Utc};
use dochub_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A user of the document-management system.
///
/// Only the columns the notification subsystem reads are mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login name.
    pub username: String,
    /// Role.
    pub role: UserRole,
    /// Latest registered device push token. Empty or absent means none.
    #[serde(skip_serializing)]
    pub push_token: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user with no push token.
    pub fn new(name: impl Into<String>, username: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            username: username.into(),
            role,
            push_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored push token, if one is usable.
    pub fn active_push_token(&self) -> Option<&str> {
        self.push_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
