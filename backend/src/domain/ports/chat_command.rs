//! Driving ports for direct messaging.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Conversation, ConversationSummary, Error, Message, MessageKey, UserId};

/// Request for one page of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMessagesRequest {
    pub user_id: UserId,
    pub conversation_id: Uuid,
    pub after: Option<MessageKey>,
    pub limit: usize,
}

/// One page of messages, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub next: Option<MessageKey>,
}

/// Chat write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCommand: Send + Sync {
    /// Open (or return the existing) conversation with an accepted friend.
    async fn open_conversation(
        &self,
        user_id: &UserId,
        peer_id: &UserId,
    ) -> Result<Conversation, Error>;

    /// Post a message as a participant and announce `message.sent`.
    async fn send_message(
        &self,
        user_id: &UserId,
        conversation_id: Uuid,
        content: String,
    ) -> Result<Message, Error>;
}

/// Chat read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatQuery: Send + Sync {
    async fn list_conversations(&self, user_id: &UserId)
    -> Result<Vec<ConversationSummary>, Error>;

    /// Participant-only paged history.
    async fn list_messages(&self, request: ListMessagesRequest) -> Result<MessagePage, Error>;
}
