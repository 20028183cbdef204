//! Target selection strategies.

use std::fmt;

use dochub_core::types::UserId;
use dochub_entity::user::UserRole;

/// Who a dispatch is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every user in the system.
    AllUsers,
    /// Users whose role is in the set.
    RoleIn(Vec<UserRole>),
    /// Exactly one user.
    SpecificUser(UserId),
}

impl Audience {
    /// The admin and superadmin roles.
    pub fn admins() -> Self {
        Self::RoleIn(UserRole::ADMINS.to_vec())
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllUsers => write!(f, "all"),
            Self::RoleIn(roles) => {
                let names: Vec<&str> = roles.iter().map(UserRole::as_str).collect();
                write!(f, "roles[{}]", names.join(","))
            }
            Self::SpecificUser(id) => write!(f, "user:{id}"),
        }
    }
}
