//! Driven port that delivers a notification to a user.

use async_trait::async_trait;

use crate::domain::{Error, Notification, NotificationDraft};

/// Stores a notification and pushes it to the user's devices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserNotifier: Send + Sync {
    /// Fails only when the notification could not be stored; push delivery
    /// is best-effort.
    async fn notify(&self, draft: NotificationDraft) -> Result<Notification, Error>;
}
