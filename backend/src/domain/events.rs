//! Domain events published after a mutation has been persisted.
//!
//! Events are facts: they are only raised once the repository call that
//! caused them succeeded, and subscribers cannot veto them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Wire name of each event kind.
///
/// The dotted names are stored inside achievement criteria, so they are part
/// of the persisted contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EventType {
    /// A post was published.
    #[serde(rename = "post.created")]
    PostCreated,
    /// A mood was recorded for a new day.
    #[serde(rename = "mood.recorded")]
    MoodRecorded,
    /// A reaction was placed on a post.
    #[serde(rename = "reaction.added")]
    ReactionAdded,
    /// A friend request was sent.
    #[serde(rename = "friend.requested")]
    FriendRequested,
    /// A friend request was accepted.
    #[serde(rename = "friend.accepted")]
    FriendAccepted,
    /// A chat message was sent.
    #[serde(rename = "message.sent")]
    MessageSent,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::PostCreated,
        Self::MoodRecorded,
        Self::ReactionAdded,
        Self::FriendRequested,
        Self::FriendAccepted,
        Self::MessageSent,
    ];

    /// Dotted wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostCreated => "post.created",
            Self::MoodRecorded => "mood.recorded",
            Self::ReactionAdded => "reaction.added",
            Self::FriendRequested => "friend.requested",
            Self::FriendAccepted => "friend.accepted",
            Self::MessageSent => "message.sent",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown event type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_owned()))
    }
}

/// Something that happened to an aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// `author_id` published `post_id`.
    PostCreated {
        post_id: Uuid,
        author_id: UserId,
    },
    /// `user_id` logged a mood for a date that had none.
    MoodRecorded {
        entry_id: Uuid,
        user_id: UserId,
        mood_date: NaiveDate,
    },
    /// `reactor_id` reacted with `emoji` to a post by `post_author_id`.
    ReactionAdded {
        post_id: Uuid,
        post_author_id: UserId,
        reactor_id: UserId,
        emoji: String,
    },
    /// `sender_id` asked `receiver_id` to be friends.
    FriendRequested {
        request_id: Uuid,
        sender_id: UserId,
        receiver_id: UserId,
    },
    /// `accepter_id` accepted the request `requester_id` sent.
    FriendAccepted {
        request_id: Uuid,
        requester_id: UserId,
        accepter_id: UserId,
    },
    /// `sender_id` wrote to `recipient_id`; `preview` is the truncated text.
    MessageSent {
        conversation_id: Uuid,
        message_id: Uuid,
        sender_id: UserId,
        recipient_id: UserId,
        preview: String,
    },
}

impl DomainEvent {
    /// The kind of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PostCreated { .. } => EventType::PostCreated,
            Self::MoodRecorded { .. } => EventType::MoodRecorded,
            Self::ReactionAdded { .. } => EventType::ReactionAdded,
            Self::FriendRequested { .. } => EventType::FriendRequested,
            Self::FriendAccepted { .. } => EventType::FriendAccepted,
            Self::MessageSent { .. } => EventType::MessageSent,
        }
    }

    /// Users whose counters may have moved because of this event.
    ///
    /// Deduplicated and in a stable order. A reaction implicates both the
    /// reactor and the post author, an accepted friendship both parties.
    ///
    /// # Examples
    /// ```
    /// use homecafe::domain::{DomainEvent, UserId};
    /// use uuid::Uuid;
    ///
    /// let author = UserId::random();
    /// let event = DomainEvent::ReactionAdded {
    ///     post_id: Uuid::new_v4(),
    ///     post_author_id: author,
    ///     reactor_id: author,
    ///     emoji: "☕".to_owned(),
    /// };
    /// assert_eq!(event.implicated_users(), vec![author]);
    /// ```
    pub fn implicated_users(&self) -> Vec<UserId> {
        let candidates = match self {
            Self::PostCreated { author_id, .. } => vec![*author_id],
            Self::MoodRecorded { user_id, .. } => vec![*user_id],
            Self::ReactionAdded {
                post_author_id,
                reactor_id,
                ..
            } => vec![*reactor_id, *post_author_id],
            Self::FriendRequested { sender_id, .. } => vec![*sender_id],
            Self::FriendAccepted {
                requester_id,
                accepter_id,
                ..
            } => vec![*requester_id, *accepter_id],
            Self::MessageSent { sender_id, .. } => vec![*sender_id],
        };

        let mut unique = Vec::with_capacity(candidates.len());
        for user in candidates {
            if !unique.contains(&user) {
                unique.push(user);
            }
        }
        unique
    }
}
