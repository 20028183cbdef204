//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_core::types::UserId;
use dochub_entity::user::{User, UserRole};

use crate::store::{PushTokenStore, UserDirectory};

const USER_COLUMNS: &str = "id, name, username, role, push_token, created_at, updated_at";

/// Repository for user lookups and push token writes.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_push_token(&self, user_id: UserId, token: Option<&str>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET push_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update push token", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn all_users(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    async fn users_with_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>> {
        let names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role::text = ANY($1) ORDER BY created_at"
        ))
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users by role", e))
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }
}

#[async_trait]
impl PushTokenStore for UserRepository {
    async fn set_push_token(&self, user_id: UserId, token: &str) -> AppResult<()> {
        if self.update_push_token(user_id, Some(token)).await? == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    async fn clear_push_token(&self, user_id: UserId) -> AppResult<()> {
        self.update_push_token(user_id, None).await?;
        Ok(())
    }
}
