//! Port for stored in-app notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification)
    -> Result<(), NotificationRepositoryError>;

    /// Newest first, at most `limit` rows.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    async fn find_by_id(
        &self,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;

    /// Set `read_at` unless it is already set.
    async fn mark_read(
        &self,
        notification_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<(), NotificationRepositoryError>;

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;
}
