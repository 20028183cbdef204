//! Custom Axum extractors.

pub mod auth;
pub mod pagination;

pub use auth::{AuthUser, USER_ID_HEADER, resolve_claim};
pub use pagination::PaginationParams;
