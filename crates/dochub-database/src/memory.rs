//! In-memory implementation of every store trait.
//!
//! Used with `database.provider = "memory"` and by tests across the
//! workspace. Cloning shares the same underlying state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{NotificationId, UserId};
use dochub_entity::activity::{ActivityLog, NewActivityLog};
use dochub_entity::notification::{NewNotification, Notification, NotificationPage};
use dochub_entity::user::{User, UserRole};

use crate::store::{ActivityLogStore, NotificationStore, PushTokenStore, UserDirectory};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    notifications: Vec<Notification>,
    activity: Vec<ActivityLog>,
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.write().await;
        state.users.retain(|u| u.id != user.id);
        state.users.push(user);
    }

    /// Insert a notification row as-is, keeping its timestamps.
    pub async fn insert_notification(&self, row: Notification) {
        self.state.write().await.notifications.push(row);
    }

    /// Insert an activity entry as-is, keeping its timestamp.
    pub async fn insert_activity(&self, entry: ActivityLog) {
        self.state.write().await.activity.push(entry);
    }

    /// Snapshot of a user.
    pub async fn user(&self, id: UserId) -> Option<User> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    /// Snapshot of every notification row, in insertion order.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    /// Snapshot of every activity entry, in insertion order.
    pub async fn activity_logs(&self) -> Vec<ActivityLog> {
        self.state.read().await.activity.clone()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.state.read().await.users.clone())
    }

    async fn users_with_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .iter()
            .filter(|u| roles.contains(&u.role))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.user(id).await)
    }
}

#[async_trait]
impl PushTokenStore for MemoryStore {
    async fn set_push_token(&self, user_id: UserId, token: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        user.push_token = Some(token.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_push_token(&self, user_id: UserId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.push_token = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == new.user_id) {
            return Err(AppError::database(format!(
                "Recipient {} does not exist",
                new.user_id
            )));
        }
        let row = Notification::from_new(new, Utc::now());
        state.notifications.push(row.clone());
        Ok(row)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: u32,
        limit: u32,
    ) -> AppResult<NotificationPage> {
        let state = self.state.read().await;
        let mut owned: Vec<&Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .collect();
        // Newest first; later inserts win ties.
        owned.reverse();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let unread_count = owned.iter().filter(|n| !n.is_read).count() as i64;
        let offset = (page.max(1) as usize - 1) * limit as usize;
        let items: Vec<Notification> = owned
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect();
        let has_more = items.len() == limit as usize;

        Ok(NotificationPage {
            items,
            unread_count,
            has_more,
        })
    }

    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<Notification> {
        let mut state = self.state.write().await;
        let row = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        if !row.is_read {
            row.is_read = true;
            row.updated_at = Utc::now();
        }
        Ok(row.clone())
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut updated = 0;
        for row in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            row.is_read = true;
            row.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.notifications.len();
        state.notifications.retain(|n| n.created_at > cutoff);
        Ok((before - state.notifications.len()) as u64)
    }
}

#[async_trait]
impl ActivityLogStore for MemoryStore {
    async fn record(&self, new: NewActivityLog) -> AppResult<ActivityLog> {
        let entry = ActivityLog::from_new(new, Utc::now());
        self.state.write().await.activity.push(entry.clone());
        Ok(entry)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.activity.len();
        state.activity.retain(|a| a.created_at > cutoff);
        Ok((before - state.activity.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    async fn store_with_user() -> (MemoryStore, UserId) {
        let store = MemoryStore::new();
        let user = User::new("Budi", "budi", UserRole::Staff);
        let id = user.id;
        store.insert_user(user).await;
        (store, id)
    }

    #[tokio::test]
    async fn test_mark_all_read_flips_only_unread() {
        let (store, user) = store_with_user().await;
        for i in 0..7 {
            let row = store
                .create(NewNotification::new(user, format!("msg {i}"), None))
                .await
                .unwrap();
            if i < 2 {
                store.mark_read(row.id, user).await.unwrap();
            }
        }

        let updated = store.mark_all_read(user).await.unwrap();
        assert_eq!(updated, 5);
        assert!(store.notifications().await.iter().all(|n| n.is_read));
        assert_eq!(store.mark_all_read(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_requires_owner() {
        let (store, user) = store_with_user().await;
        let row = store
            .create(NewNotification::new(user, "hello", None))
            .await
            .unwrap();

        let err = store.mark_read(row.id, UserId::new()).await.unwrap_err();
        assert_eq!(err.kind, dochub_core::error::ErrorKind::NotFound);

        let first = store.mark_read(row.id, user).await.unwrap();
        let second = store.mark_read(row.id, user).await.unwrap();
        assert!(first.is_read);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_unread_count() {
        let (store, user) = store_with_user().await;
        let now = Utc::now();
        for days in [3, 1, 2] {
            let mut row =
                Notification::from_new(NewNotification::new(user, format!("{days}d"), None), now);
            row.created_at = now - Duration::days(days);
            store.insert_notification(row).await;
        }

        let page = store.list_for_user(user, 1, 2).await.unwrap();
        let messages: Vec<&str> = page.items.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["1d", "2d"]);
        assert_eq!(page.unread_count, 3);
        assert!(page.has_more);

        let page = store.list_for_user(user, 2, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_push_token_latest_write_wins_and_clears() {
        let (store, user) = store_with_user().await;
        store.set_push_token(user, "first").await.unwrap();
        store.set_push_token(user, "second").await.unwrap();
        assert_eq!(store.user(user).await.unwrap().push_token.as_deref(), Some("second"));

        store.clear_push_token(user).await.unwrap();
        assert!(store.user(user).await.unwrap().active_push_token().is_none());

        let err = store.set_push_token(UserId::new(), "x").await.unwrap_err();
        assert_eq!(err.kind, dochub_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_users_with_roles_filters() {
        let store = MemoryStore::new();
        store.insert_user(User::new("A", "a", UserRole::Staff)).await;
        store.insert_user(User::new("B", "b", UserRole::Admin)).await;
        store.insert_user(User::new("C", "c", UserRole::Superadmin)).await;

        let admins = store.users_with_roles(&UserRole::ADMINS).await.unwrap();
        assert_eq!(admins.len(), 2);
        assert!(admins.iter().all(User::is_admin));
    }
}
