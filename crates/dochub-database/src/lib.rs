//! # dochub-database
//!
//! Persistence for DocHub: store traits consumed by the realtime, worker
//! and API crates, PostgreSQL repositories implementing them, and an
//! in-memory store for development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{ActivityLogStore, NotificationStore, PushTokenStore, Stores, UserDirectory};
