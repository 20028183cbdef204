//! Notification fan-out: audience selection, per-recipient delivery, and
//! supervision of background push attempts.

pub mod audience;
pub mod dispatcher;
pub mod supervisor;

pub use audience::Audience;
pub use dispatcher::{DeliveryDispatcher, DispatchReport};
pub use supervisor::PushSupervisor;
