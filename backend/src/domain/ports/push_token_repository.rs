//! Port for registered device push tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{PushToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by push token repository adapters.
    pub enum PushTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "push token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "push token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushTokenRepository: Send + Sync {
    /// Register `token` for `user_id`, taking it over from any previous
    /// owner.
    async fn upsert(
        &self,
        token: &PushToken,
        user_id: &UserId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), PushTokenRepositoryError>;

    /// Remove `token` if it belongs to `user_id`. Returns whether a row went.
    async fn delete_for_user(
        &self,
        token: &PushToken,
        user_id: &UserId,
    ) -> Result<bool, PushTokenRepositoryError>;

    /// Remove `token` regardless of owner.
    async fn delete(&self, token: &PushToken) -> Result<(), PushTokenRepositoryError>;

    async fn tokens_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PushToken>, PushTokenRepositoryError>;
}
