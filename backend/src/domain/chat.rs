//! Direct conversations between two friends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;
use super::validation::FieldViolation;

/// Longest accepted message, in characters.
pub const MESSAGE_CONTENT_MAX: usize = 4000;
/// Characters of a message carried in notifications.
pub const MESSAGE_PREVIEW_CHARS: usize = 80;

/// Validation failures for conversations and messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatValidationError {
    #[error("you cannot open a conversation with yourself")]
    SelfConversation,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message must be at most {max} characters")]
    MessageTooLong { max: usize },
}

impl FieldViolation for ChatValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::SelfConversation => "userId",
            Self::EmptyMessage | Self::MessageTooLong { .. } => "content",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::SelfConversation => "self_reference",
            Self::EmptyMessage => "empty",
            Self::MessageTooLong { .. } => "too_long",
        }
    }
}

/// A two-party conversation.
///
/// Participants are stored in ascending id order so each pair maps to one
/// row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: Uuid,
    #[schema(value_type = String)]
    participant_a: UserId,
    #[schema(value_type = String)]
    participant_b: UserId,
    created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation between two distinct users.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use homecafe::domain::{Conversation, UserId};
    /// use uuid::Uuid;
    ///
    /// let (a, b) = (UserId::random(), UserId::random());
    /// let one = Conversation::between(Uuid::new_v4(), a, b, Utc::now()).expect("pair");
    /// let two = Conversation::between(Uuid::new_v4(), b, a, Utc::now()).expect("pair");
    /// assert_eq!(one.participants(), two.participants());
    /// ```
    pub fn between(
        id: Uuid,
        first: UserId,
        second: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ChatValidationError> {
        if first == second {
            return Err(ChatValidationError::SelfConversation);
        }
        let (participant_a, participant_b) = ordered_pair(first, second);
        Ok(Self {
            id,
            participant_a,
            participant_b,
            created_at,
        })
    }

    /// Rebuild a stored conversation.
    pub fn restore(
        id: Uuid,
        participant_a: UserId,
        participant_b: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            participant_a,
            participant_b,
            created_at,
        }
    }

    /// Conversation id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Both participants, lower id first.
    pub fn participants(&self) -> (UserId, UserId) {
        (self.participant_a, self.participant_b)
    }

    /// When the conversation was opened.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `user_id` is one of the two participants.
    pub fn includes(&self, user_id: &UserId) -> bool {
        self.participant_a == *user_id || self.participant_b == *user_id
    }

    /// The other participant, or `None` when `user_id` is not a participant.
    pub fn peer_of(&self, user_id: &UserId) -> Option<UserId> {
        if self.participant_a == *user_id {
            Some(self.participant_b)
        } else if self.participant_b == *user_id {
            Some(self.participant_a)
        } else {
            None
        }
    }
}

/// Order two user ids the way conversations store them.
pub fn ordered_pair(first: UserId, second: UserId) -> (UserId, UserId) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

/// A message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: Uuid,
    conversation_id: Uuid,
    #[schema(value_type = String)]
    sender_id: UserId,
    content: String,
    sent_at: DateTime<Utc>,
}

impl Message {
    /// Validate and build a message. Content is trimmed.
    pub fn new(
        id: Uuid,
        conversation_id: Uuid,
        sender_id: UserId,
        content: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Self, ChatValidationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatValidationError::EmptyMessage);
        }
        if content.chars().count() > MESSAGE_CONTENT_MAX {
            return Err(ChatValidationError::MessageTooLong {
                max: MESSAGE_CONTENT_MAX,
            });
        }
        Ok(Self {
            id,
            conversation_id,
            sender_id,
            content: content.to_owned(),
            sent_at,
        })
    }

    /// Rebuild a stored message without re-validating.
    pub fn restore(
        id: Uuid,
        conversation_id: Uuid,
        sender_id: UserId,
        content: String,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            sent_at,
        }
    }

    /// Message id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Conversation the message belongs to.
    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    /// Author of the message.
    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    /// Message text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// When the message was sent.
    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    /// Leading characters for notifications, with an ellipsis when cut.
    pub fn preview(&self) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(MESSAGE_PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}…")
        } else {
            head
        }
    }

    /// Keyset position for newest-first paging.
    pub fn key(&self) -> MessageKey {
        MessageKey {
            sent_at: self.sent_at,
            id: self.id,
        }
    }
}

/// Keyset position within a conversation, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    pub sent_at: DateTime<Utc>,
    pub id: Uuid,
}

impl MessageKey {
    /// Whether `(sent_at, id)` sorts strictly after this key.
    pub fn precedes(&self, sent_at: DateTime<Utc>, id: Uuid) -> bool {
        (sent_at, id) < (self.sent_at, self.id)
    }
}

/// A conversation as listed for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub peer_id: UserId,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<Message>,
}

impl ConversationSummary {
    /// Time of the last message, else the creation time.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map_or(self.created_at, Message::sent_at)
    }
}
