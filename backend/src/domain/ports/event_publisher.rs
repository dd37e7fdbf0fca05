//! Driven port for announcing domain events.

use async_trait::async_trait;

use crate::domain::DomainEvent;

/// Fan-out target for events raised by use-cases.
///
/// Publishing is infallible from the caller's point of view: subscribers
/// handle their own failures and a use-case never fails because a side
/// effect did.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver `event` to every subscriber.
    async fn publish(&self, event: &DomainEvent);
}

/// Publisher that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: &DomainEvent) {}
}
