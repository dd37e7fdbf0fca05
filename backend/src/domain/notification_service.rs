//! Notification inbox service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    NotificationCommand, NotificationQuery, NotificationRepository, NotificationRepositoryError,
};
use crate::domain::{Error, NOTIFICATION_LIST_LIMIT, Notification, UserId};

/// Map repository failures to domain errors.
pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

/// Inbox service implementing [`NotificationCommand`] and
/// [`NotificationQuery`].
#[derive(Clone)]
pub struct NotificationService<R: ?Sized> {
    notifications: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> NotificationService<R> {
    /// Create a notification service over `notifications`.
    pub fn new(notifications: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }
}

#[async_trait]
impl<R> NotificationCommand for NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    async fn mark_read(
        &self,
        user_id: &UserId,
        notification_id: Uuid,
    ) -> Result<Notification, Error> {
        let mut notification = self
            .notifications
            .find_by_id(notification_id)
            .await
            .map_err(map_notification_error)?
            .ok_or_else(|| {
                Error::not_found(format!("notification {notification_id} not found"))
            })?;
        if notification.user_id != *user_id {
            return Err(Error::forbidden("notification belongs to another user"));
        }
        if notification.is_read() {
            return Ok(notification);
        }

        let read_at = self.clock.utc();
        self.notifications
            .mark_read(notification_id, read_at)
            .await
            .map_err(map_notification_error)?;
        notification.read_at = Some(read_at);
        Ok(notification)
    }
}

#[async_trait]
impl<R> NotificationQuery for NotificationService<R>
where
    R: NotificationRepository + ?Sized,
{
    async fn list_notifications(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error> {
        self.notifications
            .list_for_user(user_id, unread_only, NOTIFICATION_LIST_LIMIT)
            .await
            .map_err(map_notification_error)
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, Error> {
        self.notifications
            .unread_count(user_id)
            .await
            .map_err(map_notification_error)
    }
}
