//! Delivery dispatcher: persist, emit, push, per recipient.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use dochub_core::result::AppResult;
use dochub_database::store::{NotificationStore, UserDirectory};
use dochub_entity::notification::NewNotification;
use dochub_entity::user::User;
use dochub_push::PushMessage;

use crate::hub::Hub;
use crate::message::LiveEvent;

use super::audience::Audience;
use super::supervisor::PushSupervisor;

/// Counts from one dispatch call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Users selected by the audience.
    pub targeted: usize,
    /// Rows persisted (and live events emitted).
    pub persisted: usize,
    /// Users whose row could not be persisted.
    pub failed: usize,
    /// Background push attempts started.
    pub push_spawned: usize,
}

/// Fans one logical notification out to its audience.
#[derive(Debug, Clone)]
pub struct DeliveryDispatcher {
    hub: Hub,
    users: Arc<dyn UserDirectory>,
    notifications: Arc<dyn NotificationStore>,
    push: PushSupervisor,
    default_title: String,
    role_title: String,
}

impl DeliveryDispatcher {
    /// Create a dispatcher.
    pub fn new(
        hub: Hub,
        users: Arc<dyn UserDirectory>,
        notifications: Arc<dyn NotificationStore>,
        push: PushSupervisor,
        default_title: impl Into<String>,
        role_title: impl Into<String>,
    ) -> Self {
        Self {
            hub,
            users,
            notifications,
            push,
            default_title: default_title.into(),
            role_title: role_title.into(),
        }
    }

    /// Persist a row per target, emit a live event after each successful
    /// write, and start a push attempt without waiting for it.
    ///
    /// One recipient's failure never stops the others. Only failing to
    /// resolve the audience is an error. A missing specific user is logged
    /// and yields an empty report.
    pub async fn dispatch(
        &self,
        audience: &Audience,
        message: &str,
        link: Option<&str>,
    ) -> AppResult<DispatchReport> {
        let targets = self.resolve(audience).await?;
        let title = match audience {
            Audience::RoleIn(_) => &self.role_title,
            Audience::AllUsers | Audience::SpecificUser(_) => &self.default_title,
        };

        let mut report = DispatchReport {
            targeted: targets.len(),
            ..DispatchReport::default()
        };

        for user in targets {
            let new = NewNotification::new(user.id, message, link.map(str::to_string));
            if let Err(e) = self.notifications.create(new).await {
                warn!(
                    user_id = %user.id,
                    audience = %audience,
                    error = %e,
                    "Failed to persist notification, skipping user"
                );
                report.failed += 1;
                continue;
            }
            report.persisted += 1;

            self.hub.emit(LiveEvent::notification_added(user.id));

            let token = user.active_push_token().map(str::to_string);
            if self.push.spawn(token, PushMessage::new(user.id, title.as_str(), message)) {
                report.push_spawned += 1;
            }
        }

        info!(
            audience = %audience,
            targeted = report.targeted,
            persisted = report.persisted,
            failed = report.failed,
            push_spawned = report.push_spawned,
            "Notification dispatched"
        );
        Ok(report)
    }

    async fn resolve(&self, audience: &Audience) -> AppResult<Vec<User>> {
        match audience {
            Audience::AllUsers => self.users.all_users().await,
            Audience::RoleIn(roles) => self.users.users_with_roles(roles).await,
            Audience::SpecificUser(id) => match self.users.find_by_id(*id).await? {
                Some(user) => Ok(vec![user]),
                None => {
                    info!(user_id = %id, "Notification target not found, nothing dispatched");
                    Ok(Vec::new())
                }
            },
        }
    }
}
