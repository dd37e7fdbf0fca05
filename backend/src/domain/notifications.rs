//! In-app notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Most notifications returned by one listing.
pub const NOTIFICATION_LIST_LIMIT: usize = 100;

/// Why a notification was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RewardEarned,
    PostReaction,
    FriendRequest,
    FriendAccepted,
    NewMessage,
}

impl NotificationKind {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RewardEarned => "reward_earned",
            Self::PostReaction => "post_reaction",
            Self::FriendRequest => "friend_request",
            Self::FriendAccepted => "friend_accepted",
            Self::NewMessage => "new_message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored notification kind did not match any known value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification kind: {0}")]
pub struct UnknownNotificationKind(pub String);

impl FromStr for NotificationKind {
    type Err = UnknownNotificationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::RewardEarned,
            Self::PostReaction,
            Self::FriendRequest,
            Self::FriendAccepted,
            Self::NewMessage,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == s)
        .ok_or_else(|| UnknownNotificationKind(s.to_owned()))
    }
}

/// A notification about to be delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Client routing data, e.g. `{"postId": "..."}`.
    pub data: Value,
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    #[schema(value_type = Object)]
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Materialise a draft.
    pub fn from_draft(id: Uuid, draft: NotificationDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            kind: draft.kind,
            title: draft.title,
            body: draft.body,
            data: draft.data,
            created_at,
            read_at: None,
        }
    }

    /// Whether the recipient has read it.
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(NotificationKind::RewardEarned, "reward_earned")]
    #[case(NotificationKind::NewMessage, "new_message")]
    fn kind_text_round_trips(#[case] kind: NotificationKind, #[case] text: &str) {
        assert_eq!(kind.as_str(), text);
        assert_eq!(text.parse::<NotificationKind>(), Ok(kind));
        assert_eq!(serde_json::to_value(kind).expect("serialise kind"), json!(text));
    }

    #[rstest]
    fn drafts_start_unread() {
        let draft = NotificationDraft {
            user_id: UserId::random(),
            kind: NotificationKind::FriendRequest,
            title: "New friend request".to_owned(),
            body: "Ada wants to be friends".to_owned(),
            data: json!({}),
        };
        let notification = Notification::from_draft(Uuid::new_v4(), draft, Utc::now());
        assert!(!notification.is_read());
    }
}
