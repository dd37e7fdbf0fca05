//! Driven port for the mobile push service.

use async_trait::async_trait;

use crate::domain::{PushMessage, PushOutcome, PushReceipt};

use super::define_port_error;

define_port_error! {
    /// Errors raised by push delivery adapters.
    pub enum PushSendError {
        /// The push service could not be reached.
        Transport { message: String } => "push transport failed: {message}",
        /// The push service answered with something unusable.
        Response { message: String } => "push service response invalid: {message}",
    }
}

/// Sends push messages and reports a receipt per message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<PushReceipt>, PushSendError>;
}

/// Sender used when push delivery is disabled; accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPushSender;

#[async_trait]
impl PushSender for NoOpPushSender {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<PushReceipt>, PushSendError> {
        Ok(messages
            .iter()
            .map(|message| PushReceipt {
                token: message.to.clone(),
                outcome: PushOutcome::Accepted,
            })
            .collect())
    }
}
