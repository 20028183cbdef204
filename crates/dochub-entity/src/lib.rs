//! # dochub-entity
//!
//! Domain entity models for DocHub. Database entities derive
//! `sqlx::FromRow` in addition to the serde traits.

pub mod activity;
pub mod notification;
pub mod user;
