//! # dochub-realtime
//!
//! Real-time delivery for DocHub:
//!
//! - a connection registry actor mapping users to their live connections
//! - the delivery dispatcher that persists, emits, and pushes per recipient
//! - a supervisor bounding and draining background push attempts

pub mod connection;
pub mod engine;
pub mod hub;
pub mod message;
pub mod notification;

pub use connection::{ConnectionGuard, LiveConnection};
pub use engine::RealtimeEngine;
pub use hub::Hub;
pub use message::LiveEvent;
pub use notification::{Audience, DeliveryDispatcher, DispatchReport, PushSupervisor};
