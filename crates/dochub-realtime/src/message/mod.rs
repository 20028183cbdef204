//! Payloads written to live connections.

pub mod types;

pub use types::{EventKind, LiveEvent};
