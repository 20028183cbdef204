//! # dochub-push
//!
//! Best-effort delivery of notifications to a user's registered device.
//! The stored token's shape selects the provider: Expo push tokens go to
//! the Expo push API, long opaque tokens go to Firebase Cloud Messaging,
//! and anything else is tried against both in turn. Tokens a provider
//! reports as permanently invalid are cleared from the user record.

pub mod error;
pub mod expo;
pub mod fcm;
pub mod message;
pub mod provider;
pub mod service;
pub mod token;

pub use error::PushError;
pub use message::PushMessage;
pub use provider::PushProvider;
pub use service::{PushOutcome, PushService};
pub use token::TokenKind;
