//! Driving ports for reading and acknowledging notifications.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Notification, UserId};

/// Notification write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Mark one of the caller's notifications read. Repeating it is a no-op.
    async fn mark_read(&self, user_id: &UserId, notification_id: Uuid)
    -> Result<Notification, Error>;
}

/// Notification read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    /// Newest first, optionally unread only.
    async fn list_notifications(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, Error>;

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, Error>;
}
