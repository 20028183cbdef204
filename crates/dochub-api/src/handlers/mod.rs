//! HTTP and WebSocket handlers.

pub mod admin;
pub mod health;
pub mod notification;
pub mod user;
pub mod ws;
