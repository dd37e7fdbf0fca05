//! In-process event fan-out.
//!
//! Handlers are registered once at start-up and called sequentially, in
//! registration order, on the task that published the event. A failing or
//! panicking handler is logged and skipped; the next handler still runs.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::domain::DomainEvent;
use crate::domain::ports::{EventHandler, EventPublisher};

/// Event publisher that forwards each event to a fixed handler list.
#[derive(Clone, Default)]
pub struct InProcessEventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl InProcessEventDispatcher {
    /// Create a dispatcher over `handlers`.
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self { handlers }
    }

    /// Names of the registered handlers, in call order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }
}

#[async_trait]
impl EventPublisher for InProcessEventDispatcher {
    async fn publish(&self, event: &DomainEvent) {
        let event_type = event.event_type();
        for handler in &self.handlers {
            let outcome = AssertUnwindSafe(handler.handle(event)).catch_unwind().await;
            match outcome {
                Ok(Ok(())) => {
                    debug!(handler = handler.name(), %event_type, "event handled");
                }
                Ok(Err(error)) => {
                    warn!(
                        handler = handler.name(),
                        %event_type,
                        code = ?error.code(),
                        %error,
                        "event handler failed"
                    );
                }
                Err(_) => {
                    warn!(handler = handler.name(), %event_type, "event handler panicked");
                }
            }
        }
    }
}
