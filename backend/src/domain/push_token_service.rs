//! Push token registration service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{PushTokenCommand, PushTokenRepository, PushTokenRepositoryError};
use crate::domain::validation::invalid_field;
use crate::domain::{Error, PushToken, UserId};

fn map_repository_error(error: PushTokenRepositoryError) -> Error {
    match error {
        PushTokenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("push token repository unavailable: {message}"))
        }
        PushTokenRepositoryError::Query { message } => {
            Error::internal(format!("push token repository error: {message}"))
        }
    }
}

/// Implements [`PushTokenCommand`].
#[derive(Clone)]
pub struct PushTokenService<R: ?Sized> {
    tokens: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> PushTokenService<R> {
    /// Create a push token service over `tokens`.
    pub fn new(tokens: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }
}

#[async_trait]
impl<R> PushTokenCommand for PushTokenService<R>
where
    R: PushTokenRepository + ?Sized,
{
    async fn register_token(&self, user_id: &UserId, token: String) -> Result<(), Error> {
        let token = PushToken::new(token).map_err(|err| invalid_field(&err))?;
        self.tokens
            .upsert(&token, user_id, self.clock.utc())
            .await
            .map_err(map_repository_error)
    }

    async fn unregister_token(&self, user_id: &UserId, token: String) -> Result<(), Error> {
        let token = PushToken::new(token).map_err(|err| invalid_field(&err))?;
        let removed = self
            .tokens
            .delete_for_user(&token, user_id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            debug!(%user_id, "push token was not registered");
        }
        Ok(())
    }
}
