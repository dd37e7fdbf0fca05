//! Subscriber port invoked by the event dispatcher.

use async_trait::async_trait;

use crate::domain::{DomainEvent, Error};

/// A side effect attached to domain events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short stable name used in logs.
    fn name(&self) -> &'static str;

    /// React to `event`. Errors are logged by the dispatcher and dropped.
    async fn handle(&self, event: &DomainEvent) -> Result<(), Error>;
}
