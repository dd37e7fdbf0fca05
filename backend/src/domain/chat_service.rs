//! Direct messaging service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    ChatCommand, ChatQuery, ChatRepository, ChatRepositoryError, EventPublisher,
    FriendRepository, FriendRepositoryError, ListMessagesRequest, MessagePage,
};
use crate::domain::validation::invalid_field;
use crate::domain::{
    ChatValidationError, Conversation, ConversationSummary, DomainEvent, Error, Message, UserId,
};

fn map_chat_error(error: ChatRepositoryError) -> Error {
    match error {
        ChatRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("chat repository unavailable: {message}"))
        }
        ChatRepositoryError::Query { message } => {
            Error::internal(format!("chat repository error: {message}"))
        }
        ChatRepositoryError::Duplicate => Error::conflict("conversation already exists"),
    }
}

fn map_friend_error(error: FriendRepositoryError) -> Error {
    match error {
        FriendRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("friend repository unavailable: {message}"))
        }
        other => Error::internal(format!("friend repository error: {other}")),
    }
}

/// Chat service implementing [`ChatCommand`] and [`ChatQuery`].
#[derive(Clone)]
pub struct ChatService<C: ?Sized, F: ?Sized> {
    chats: Arc<C>,
    friends: Arc<F>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl<C: ?Sized, F: ?Sized> ChatService<C, F> {
    /// Create a chat service; friendship is checked through `friends`.
    pub fn new(
        chats: Arc<C>,
        friends: Arc<F>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            friends,
            events,
            clock,
        }
    }
}

impl<C, F> ChatService<C, F>
where
    C: ChatRepository + ?Sized,
    F: FriendRepository + ?Sized,
{
    /// Load a conversation and the caller's peer in it.
    async fn participant_view(
        &self,
        user_id: &UserId,
        conversation_id: Uuid,
    ) -> Result<(Conversation, UserId), Error> {
        let conversation = self
            .chats
            .find_conversation_by_id(conversation_id)
            .await
            .map_err(map_chat_error)?
            .ok_or_else(|| {
                Error::not_found(format!("conversation {conversation_id} not found"))
            })?;
        let peer = conversation
            .peer_of(user_id)
            .ok_or_else(|| Error::forbidden("you are not part of this conversation"))?;
        Ok((conversation, peer))
    }
}

#[async_trait]
impl<C, F> ChatCommand for ChatService<C, F>
where
    C: ChatRepository + ?Sized,
    F: FriendRepository + ?Sized,
{
    async fn open_conversation(
        &self,
        user_id: &UserId,
        peer_id: &UserId,
    ) -> Result<Conversation, Error> {
        if user_id == peer_id {
            return Err(invalid_field(&ChatValidationError::SelfConversation));
        }
        let friends = self
            .friends
            .are_friends(user_id, peer_id)
            .await
            .map_err(map_friend_error)?;
        if !friends {
            return Err(Error::forbidden("you can only message friends"));
        }

        if let Some(existing) = self
            .chats
            .find_conversation(user_id, peer_id)
            .await
            .map_err(map_chat_error)?
        {
            return Ok(existing);
        }

        let conversation =
            Conversation::between(Uuid::new_v4(), *user_id, *peer_id, self.clock.utc())
                .map_err(|err| invalid_field(&err))?;
        match self.chats.insert_conversation(&conversation).await {
            Ok(()) => Ok(conversation),
            // Opened concurrently by the peer; hand back their row.
            Err(ChatRepositoryError::Duplicate) => self
                .chats
                .find_conversation(user_id, peer_id)
                .await
                .map_err(map_chat_error)?
                .ok_or_else(|| Error::internal("conversation vanished after conflict")),
            Err(other) => Err(map_chat_error(other)),
        }
    }

    async fn send_message(
        &self,
        user_id: &UserId,
        conversation_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        let message = Message::new(
            Uuid::new_v4(),
            conversation_id,
            *user_id,
            &content,
            self.clock.utc(),
        )
        .map_err(|err| invalid_field(&err))?;
        let (conversation, recipient_id) = self.participant_view(user_id, conversation_id).await?;

        self.chats
            .insert_message(&message)
            .await
            .map_err(map_chat_error)?;
        self.events
            .publish(&DomainEvent::MessageSent {
                conversation_id: conversation.id(),
                message_id: message.id(),
                sender_id: *user_id,
                recipient_id,
                preview: message.preview(),
            })
            .await;
        Ok(message)
    }
}

#[async_trait]
impl<C, F> ChatQuery for ChatService<C, F>
where
    C: ChatRepository + ?Sized,
    F: FriendRepository + ?Sized,
{
    async fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, Error> {
        self.chats
            .list_conversations(user_id)
            .await
            .map_err(map_chat_error)
    }

    async fn list_messages(&self, request: ListMessagesRequest) -> Result<MessagePage, Error> {
        self.participant_view(&request.user_id, request.conversation_id)
            .await?;
        let mut messages = self
            .chats
            .list_messages(
                request.conversation_id,
                request.after,
                request.limit.saturating_add(1),
            )
            .await
            .map_err(map_chat_error)?;
        let next = if messages.len() > request.limit {
            messages.truncate(request.limit);
            messages.last().map(Message::key)
        } else {
            None
        };
        Ok(MessagePage { messages, next })
    }
}

#[cfg(test)]
#[path = "chat_service_tests.rs"]
mod tests;
