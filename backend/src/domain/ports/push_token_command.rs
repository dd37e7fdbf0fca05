//! Driving port for device push token registration.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushTokenCommand: Send + Sync {
    /// Register a device token for the caller.
    async fn register_token(&self, user_id: &UserId, token: String) -> Result<(), Error>;

    /// Forget one of the caller's tokens. Unknown tokens are ignored.
    async fn unregister_token(&self, user_id: &UserId, token: String) -> Result<(), Error>;
}
