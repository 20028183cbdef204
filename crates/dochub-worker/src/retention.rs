//! Retention sweep over notifications and activity logs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing;

use dochub_core::error::AppError;
use dochub_database::store::{ActivityLogStore, NotificationStore};

/// Rows removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Everything created at or before this instant was eligible.
    pub cutoff: DateTime<Utc>,
    /// Notifications deleted.
    pub notifications_deleted: u64,
    /// Activity log entries deleted.
    pub activity_logs_deleted: u64,
}

/// Deletes rows older than the retention horizon.
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    notifications: Arc<dyn NotificationStore>,
    activity: Arc<dyn ActivityLogStore>,
    horizon: Duration,
}

impl RetentionSweeper {
    /// Create a sweeper keeping `horizon_days` of history.
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        activity: Arc<dyn ActivityLogStore>,
        horizon_days: i64,
    ) -> Self {
        Self {
            notifications,
            activity,
            horizon: Duration::days(horizon_days),
        }
    }

    /// Run one sweep relative to `now`.
    ///
    /// The two tables are swept independently; a failure on one does not
    /// prevent the other. The first error is returned after both ran.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let cutoff = now - self.horizon;
        let mut report = SweepReport {
            cutoff,
            ..SweepReport::default()
        };
        let mut first_error = None;

        match self.notifications.delete_created_before(cutoff).await {
            Ok(count) => {
                report.notifications_deleted = count;
                tracing::info!(count, cutoff = %cutoff, "Deleted expired notifications");
            }
            Err(e) => {
                tracing::error!(error = %e, "Notification retention sweep failed");
                first_error.get_or_insert(e);
            }
        }

        match self.activity.delete_created_before(cutoff).await {
            Ok(count) => {
                report.activity_logs_deleted = count;
                tracing::info!(count, cutoff = %cutoff, "Deleted expired activity logs");
            }
            Err(e) => {
                tracing::error!(error = %e, "Activity log retention sweep failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use dochub_database::MemoryStore;
    use dochub_entity::activity::{ActivityLog, NewActivityLog};
    use dochub_entity::notification::{NewNotification, Notification};
    use dochub_entity::user::{User, UserRole};

    use super::*;

    fn sweeper(store: &MemoryStore) -> RetentionSweeper {
        RetentionSweeper::new(Arc::new(store.clone()), Arc::new(store.clone()), 30)
    }

    #[tokio::test]
    async fn test_31_days_deleted_29_days_kept() {
        let store = MemoryStore::new();
        let user = User::new("Eko", "eko", UserRole::Staff);
        store.insert_user(user.clone()).await;
        let now = Utc::now();

        for (days, label) in [(31, "old"), (29, "recent")] {
            let created = now - Duration::days(days);
            store
                .insert_notification(Notification::from_new(
                    NewNotification::new(user.id, label, None),
                    created,
                ))
                .await;
            store
                .insert_activity(ActivityLog::from_new(
                    NewActivityLog {
                        user_id: user.id,
                        user_name: user.name.clone(),
                        action: "document.upload".into(),
                        message: label.into(),
                    },
                    created,
                ))
                .await;
        }

        let report = sweeper(&store).sweep_once(now).await.unwrap();
        assert_eq!(report.notifications_deleted, 1);
        assert_eq!(report.activity_logs_deleted, 1);

        let remaining = store.notifications().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "recent");
        assert_eq!(store.activity_logs().await[0].message, "recent");
    }

    #[tokio::test]
    async fn test_row_exactly_at_horizon_is_deleted() {
        let store = MemoryStore::new();
        let user = User::new("Fajar", "fajar", UserRole::Staff);
        store.insert_user(user.clone()).await;
        let now = Utc::now();
        store
            .insert_notification(Notification::from_new(
                NewNotification::new(user.id, "edge", None),
                now - Duration::days(30),
            ))
            .await;

        let report = sweeper(&store).sweep_once(now).await.unwrap();
        assert_eq!(report.notifications_deleted, 1);
    }
}
