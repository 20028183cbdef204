//! Live connection handles and their cleanup guard.

pub mod guard;
pub mod handle;

pub use guard::ConnectionGuard;
pub use handle::{LiveConnection, SendStatus};
