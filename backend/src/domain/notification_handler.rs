//! Turns social events into inbox notifications.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{EventHandler, UserNotifier, UserRepository};
use crate::domain::{DomainEvent, Error, NotificationDraft, NotificationKind, UserId};

const UNKNOWN_ACTOR: &str = "Someone";

/// Notifies the user on the receiving end of reactions, friend requests and
/// messages.
pub struct SocialNotificationHandler<U: ?Sized> {
    users: Arc<U>,
    notifier: Arc<dyn UserNotifier>,
}

impl<U: ?Sized> SocialNotificationHandler<U> {
    /// Create a handler that looks up display names in `users`.
    pub fn new(users: Arc<U>, notifier: Arc<dyn UserNotifier>) -> Self {
        Self { users, notifier }
    }
}

impl<U> SocialNotificationHandler<U>
where
    U: UserRepository + ?Sized,
{
    async fn actor_name(&self, user_id: &UserId) -> String {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user.display_name().to_string(),
            Ok(None) => UNKNOWN_ACTOR.to_owned(),
            Err(error) => {
                debug!(%user_id, %error, "actor lookup failed");
                UNKNOWN_ACTOR.to_owned()
            }
        }
    }

    async fn draft_for(&self, event: &DomainEvent) -> Option<NotificationDraft> {
        let draft = match event {
            DomainEvent::ReactionAdded {
                post_id,
                post_author_id,
                reactor_id,
                emoji,
            } => {
                if reactor_id == post_author_id {
                    return None;
                }
                NotificationDraft {
                    user_id: *post_author_id,
                    kind: NotificationKind::PostReaction,
                    title: "New reaction".to_owned(),
                    body: format!(
                        "{} reacted {emoji} to your post",
                        self.actor_name(reactor_id).await
                    ),
                    data: json!({ "postId": post_id, "emoji": emoji }),
                }
            }
            DomainEvent::FriendRequested {
                request_id,
                sender_id,
                receiver_id,
            } => NotificationDraft {
                user_id: *receiver_id,
                kind: NotificationKind::FriendRequest,
                title: "New friend request".to_owned(),
                body: format!("{} wants to be friends", self.actor_name(sender_id).await),
                data: json!({ "requestId": request_id, "senderId": sender_id }),
            },
            DomainEvent::FriendAccepted {
                request_id,
                requester_id,
                accepter_id,
            } => NotificationDraft {
                user_id: *requester_id,
                kind: NotificationKind::FriendAccepted,
                title: "Friend request accepted".to_owned(),
                body: format!(
                    "{} accepted your friend request",
                    self.actor_name(accepter_id).await
                ),
                data: json!({ "requestId": request_id, "userId": accepter_id }),
            },
            DomainEvent::MessageSent {
                conversation_id,
                message_id,
                sender_id,
                recipient_id,
                preview,
            } => NotificationDraft {
                user_id: *recipient_id,
                kind: NotificationKind::NewMessage,
                title: format!("New message from {}", self.actor_name(sender_id).await),
                body: preview.clone(),
                data: json!({ "conversationId": conversation_id, "messageId": message_id }),
            },
            DomainEvent::PostCreated { .. } | DomainEvent::MoodRecorded { .. } => return None,
        };
        Some(draft)
    }
}

#[async_trait]
impl<U> EventHandler for SocialNotificationHandler<U>
where
    U: UserRepository + ?Sized,
{
    fn name(&self) -> &'static str {
        "notifications"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), Error> {
        let Some(draft) = self.draft_for(event).await else {
            return Ok(());
        };
        self.notifier.notify(draft).await.map(|_| ())
    }
}
