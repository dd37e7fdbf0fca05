//! Port for conversations and messages.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Conversation, ConversationSummary, Message, MessageKey, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by chat repository adapters.
    pub enum ChatRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "chat repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "chat repository query failed: {message}",
        /// A conversation for the pair already exists.
        Duplicate => "conversation already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// The conversation between two users, in either argument order.
    async fn find_conversation(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, ChatRepositoryError>;

    /// Persist a conversation; [`ChatRepositoryError::Duplicate`] when the
    /// pair already has one.
    async fn insert_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), ChatRepositoryError>;

    async fn find_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, ChatRepositoryError>;

    /// Conversations involving `user_id`, most recently active first.
    async fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, ChatRepositoryError>;

    async fn insert_message(&self, message: &Message) -> Result<(), ChatRepositoryError>;

    /// Messages newest first, strictly after `before` when given.
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        before: Option<MessageKey>,
        limit: usize,
    ) -> Result<Vec<Message>, ChatRepositoryError>;
}
