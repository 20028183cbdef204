//! Store traits and the provider-selected bundle of stores.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use dochub_core::config::DatabaseConfig;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::{NotificationId, UserId};
use dochub_entity::activity::{ActivityLog, NewActivityLog};
use dochub_entity::notification::{NewNotification, Notification, NotificationPage};
use dochub_entity::user::{User, UserRole};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{ActivityLogRepository, NotificationRepository, UserRepository};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Read access to users for audience resolution.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Every user in the system.
    async fn all_users(&self) -> AppResult<Vec<User>>;

    /// Users whose role is one of `roles`.
    async fn users_with_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>>;

    /// Look up a single user.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;
}

/// Write access to a user's single push token.
#[async_trait]
pub trait PushTokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Store or replace the user's token. Latest write wins.
    async fn set_push_token(&self, user_id: UserId, token: &str) -> AppResult<()>;

    /// Clear the user's token after a permanent-invalid provider response.
    async fn clear_push_token(&self, user_id: UserId) -> AppResult<()>;
}

/// Durable notification rows.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist one row for one recipient.
    async fn create(&self, new: NewNotification) -> AppResult<Notification>;

    /// One page of the user's notifications, newest first. `page` starts at 1.
    async fn list_for_user(&self, user_id: UserId, page: u32, limit: u32)
    -> AppResult<NotificationPage>;

    /// Mark one of the user's notifications as read.
    ///
    /// Fails with not-found when the row does not exist or belongs to
    /// someone else. Already-read rows are returned unchanged.
    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> AppResult<Notification>;

    /// Mark every unread notification of the user as read; returns how many flipped.
    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64>;

    /// Delete rows with `created_at <= cutoff`; returns how many were removed.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Activity log entries.
#[async_trait]
pub trait ActivityLogStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append an entry.
    async fn record(&self, new: NewActivityLog) -> AppResult<ActivityLog>;

    /// Delete entries with `created_at <= cutoff`; returns how many were removed.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// The set of stores, backed by the configured provider.
#[derive(Debug, Clone)]
pub struct Stores {
    /// User lookup.
    pub users: Arc<dyn UserDirectory>,
    /// Push token writes.
    pub push_tokens: Arc<dyn PushTokenStore>,
    /// Notification rows.
    pub notifications: Arc<dyn NotificationStore>,
    /// Activity log entries.
    pub activity: Arc<dyn ActivityLogStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// Build the stores selected by `config.provider`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL stores");
                let pool = DatabasePool::connect(config).await?;
                run_migrations(pool.pool()).await?;
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Initializing in-memory stores");
                Ok(Self::memory(MemoryStore::new()))
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Supported: postgres, memory"
            ))),
        }
    }

    /// Stores backed by PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        let users = Arc::new(UserRepository::new(pg.clone()));
        Self {
            users: users.clone(),
            push_tokens: users,
            notifications: Arc::new(NotificationRepository::new(pg.clone())),
            activity: Arc::new(ActivityLogRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Stores backed by one in-memory store.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            push_tokens: store.clone(),
            notifications: store.clone(),
            activity: store,
            pool: None,
        }
    }

    /// Check that the backing database is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.ping().await,
            None => Ok(true),
        }
    }

    /// Release database connections, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_unknown_provider() {
        let config = DatabaseConfig {
            provider: "sqlite".into(),
            ..DatabaseConfig::default()
        };
        let err = Stores::connect(&config).await.unwrap_err();
        assert_eq!(err.kind, dochub_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_memory_provider_is_healthy() {
        let config = DatabaseConfig {
            provider: "memory".into(),
            ..DatabaseConfig::default()
        };
        let stores = Stores::connect(&config).await.unwrap();
        assert!(stores.health_check().await.unwrap());
        assert!(stores.users.all_users().await.unwrap().is_empty());
    }
}
