//! Push provider trait.

use async_trait::async_trait;

use crate::error::PushError;
use crate::message::PushMessage;

/// A third-party push service.
#[async_trait]
pub trait PushProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Deliver `message` to the device identified by `token`, once.
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError>;

    /// Confirm our credentials are accepted without sending anything.
    async fn check(&self) -> Result<(), PushError> {
        Ok(())
    }
}
