//! Profile lookup for the signed-in user.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserProfileQuery, UserRepository};
use crate::domain::{Error, User, UserId};

/// Implements [`UserProfileQuery`] over a [`UserRepository`].
#[derive(Clone)]
pub struct UserProfileService<R: ?Sized> {
    users: Arc<R>,
}

impl<R: ?Sized> UserProfileService<R> {
    /// Create a profile service over `users`.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R> UserProfileQuery for UserProfileService<R>
where
    R: UserRepository + ?Sized,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(|err| match err {
                UserPersistenceError::Connection { message } => {
                    Error::service_unavailable(format!("user repository unavailable: {message}"))
                }
                UserPersistenceError::Query { message } => {
                    Error::internal(format!("user repository error: {message}"))
                }
            })?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}
