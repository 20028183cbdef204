//! PostgreSQL repository implementations of the store traits.

pub mod activity;
pub mod notification;
pub mod user;

pub use activity::ActivityLogRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;
