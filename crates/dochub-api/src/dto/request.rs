//! Request DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::UserId;
use dochub_entity::user::UserRole;
use dochub_realtime::Audience;

/// Run the derived validators, mapping failures to a validation error.
pub fn validate_body<T: Validate>(body: &T) -> AppResult<()> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// Store or replace the caller's push token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PushTokenRequest {
    /// Device token issued by Expo or FCM.
    #[validate(length(min = 1, max = 4096, message = "Token is required"))]
    pub token: String,
}

/// Audience selector of an admin dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchTarget {
    /// Everyone.
    All,
    /// Users with one of `roles` (admins when omitted).
    Roles,
    /// The user named by `user_id`.
    User,
}

/// Admin request to fan out a notification.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchRequest {
    /// Who receives it.
    pub target: DispatchTarget,
    /// Roles for `target = roles`.
    #[serde(default)]
    pub roles: Option<Vec<UserRole>>,
    /// Recipient for `target = user`.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Notification text.
    #[validate(length(min = 1, max = 1000, message = "Message is required"))]
    pub message: String,
    /// Optional in-app link.
    #[serde(default)]
    pub link: Option<String>,
}

impl DispatchRequest {
    /// Resolve the target fields into an audience.
    pub fn audience(&self) -> AppResult<Audience> {
        match self.target {
            DispatchTarget::All => Ok(Audience::AllUsers),
            DispatchTarget::Roles => match &self.roles {
                Some(roles) if !roles.is_empty() => Ok(Audience::RoleIn(roles.clone())),
                _ => Ok(Audience::admins()),
            },
            DispatchTarget::User => self
                .user_id
                .map(Audience::SpecificUser)
                .ok_or_else(|| AppError::validation("user_id is required for target 'user'")),
        }
    }

    /// The link, with blank values treated as absent.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}
