//! Activity log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;
use dochub_entity::activity::{ActivityLog, NewActivityLog};

use crate::store::ActivityLogStore;

/// Append-only repository for activity log entries.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    /// Create a new activity log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogStore for ActivityLogRepository {
    async fn record(&self, new: NewActivityLog) -> AppResult<ActivityLog> {
        sqlx::query_as::<_, ActivityLog>(
            "INSERT INTO activity_logs (id, user_id, user_name, action, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, user_name, action, message, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.user_name)
        .bind(&new.action)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record activity", e))
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM activity_logs WHERE created_at <= $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete old activity logs", e)
            })?;
        Ok(result.rows_affected())
    }
}
