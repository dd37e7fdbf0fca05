//! Notification delivery: store first, then push best-effort.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::notification_service::map_notification_error;
use crate::domain::ports::{NotificationRepository, PushSender, PushTokenRepository, UserNotifier};
use crate::domain::{
    Error, Notification, NotificationDraft, PushMessage, PushOutcome, PushReceipt, UserId,
};

/// [`UserNotifier`] that persists notifications and pushes them to every
/// device the recipient registered.
#[derive(Clone)]
pub struct NotificationDispatchService<N: ?Sized, T: ?Sized> {
    notifications: Arc<N>,
    tokens: Arc<T>,
    push: Arc<dyn PushSender>,
    clock: Arc<dyn Clock>,
}

impl<N: ?Sized, T: ?Sized> NotificationDispatchService<N, T> {
    /// Create a notifier that stores through `notifications` and pushes via `push`.
    pub fn new(
        notifications: Arc<N>,
        tokens: Arc<T>,
        push: Arc<dyn PushSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            tokens,
            push,
            clock,
        }
    }
}

fn push_payload(notification: &Notification) -> Value {
    let mut data = match &notification.data {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    data.insert("notificationId".into(), json!(notification.id));
    data.insert("kind".into(), json!(notification.kind));
    Value::Object(data)
}

impl<N, T> NotificationDispatchService<N, T>
where
    N: NotificationRepository + ?Sized,
    T: PushTokenRepository + ?Sized,
{
    async fn push_to_devices(&self, user_id: &UserId, notification: &Notification) {
        let tokens = match self.tokens.tokens_for_user(user_id).await {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!(%user_id, %error, "could not load push tokens");
                return;
            }
        };
        if tokens.is_empty() {
            debug!(%user_id, "no push tokens registered");
            return;
        }

        let data = push_payload(notification);
        let messages: Vec<_> = tokens
            .into_iter()
            .map(|to| PushMessage {
                to,
                title: notification.title.clone(),
                body: notification.body.clone(),
                data: data.clone(),
            })
            .collect();

        match self.push.send(&messages).await {
            Ok(receipts) => self.handle_receipts(user_id, receipts).await,
            Err(error) => warn!(%user_id, %error, "push delivery failed"),
        }
    }

    async fn handle_receipts(&self, user_id: &UserId, receipts: Vec<PushReceipt>) {
        for receipt in receipts {
            match receipt.outcome {
                PushOutcome::Accepted => {}
                PushOutcome::DeviceNotRegistered => {
                    info!(%user_id, "dropping unregistered push token");
                    if let Err(error) = self.tokens.delete(&receipt.token).await {
                        warn!(%user_id, %error, "could not drop push token");
                    }
                }
                PushOutcome::Failed(reason) => {
                    warn!(%user_id, %reason, "push message rejected");
                }
            }
        }
    }
}

#[async_trait]
impl<N, T> UserNotifier for NotificationDispatchService<N, T>
where
    N: NotificationRepository + ?Sized,
    T: PushTokenRepository + ?Sized,
{
    async fn notify(&self, draft: NotificationDraft) -> Result<Notification, Error> {
        let user_id = draft.user_id;
        let notification = Notification::from_draft(Uuid::new_v4(), draft, self.clock.utc());
        self.notifications
            .insert(&notification)
            .await
            .map_err(map_notification_error)?;
        self.push_to_devices(&user_id, &notification).await;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixture_clock::FixtureClock;
    use crate::domain::ports::{
        MockNotificationRepository, MockPushSender, MockPushTokenRepository,
        NotificationRepositoryError, PushSendError,
    };
    use crate::domain::{ErrorCode, NotificationKind, PushToken};
    use rstest::rstest;

    fn draft(user_id: UserId) -> NotificationDraft {
        NotificationDraft {
            user_id,
            kind: NotificationKind::FriendAccepted,
            title: "Friend request accepted".to_owned(),
            body: "Grace accepted your friend request".to_owned(),
            data: json!({ "requestId": "abc" }),
        }
    }

    fn token(raw: &str) -> PushToken {
        PushToken::new(format!("ExponentPushToken[{raw}]")).expect("token")
    }

    fn notifier(
        notifications: MockNotificationRepository,
        tokens: MockPushTokenRepository,
        push: MockPushSender,
    ) -> NotificationDispatchService<MockNotificationRepository, MockPushTokenRepository> {
        NotificationDispatchService::new(
            Arc::new(notifications),
            Arc::new(tokens),
            Arc::new(push),
            Arc::new(FixtureClock::default()),
        )
    }

    fn storing() -> MockNotificationRepository {
        let mut notifications = MockNotificationRepository::new();
        notifications.expect_insert().times(1).returning(|_| Ok(()));
        notifications
    }

    #[rstest]
    #[tokio::test]
    async fn stores_and_pushes_with_routing_data() {
        let mut tokens = MockPushTokenRepository::new();
        tokens
            .expect_tokens_for_user()
            .return_once(|_| Ok(vec![token("one"), token("two")]));
        let mut push = MockPushSender::new();
        push.expect_send()
            .withf(|messages| {
                messages.len() == 2
                    && messages
                        .iter()
                        .all(|m| m.data["kind"] == "friend_accepted" && m.data["requestId"] == "abc")
            })
            .times(1)
            .returning(|messages| {
                Ok(messages
                    .iter()
                    .map(|m| PushReceipt {
                        token: m.to.clone(),
                        outcome: PushOutcome::Accepted,
                    })
                    .collect())
            });

        let stored = notifier(storing(), tokens, push)
            .notify(draft(UserId::random()))
            .await
            .expect("notify");
        assert_eq!(stored.created_at, FixtureClock::default_instant());
    }

    #[rstest]
    #[tokio::test]
    async fn unregistered_devices_are_forgotten() {
        let stale = token("stale");
        let expected = stale.clone();
        let mut tokens = MockPushTokenRepository::new();
        tokens
            .expect_tokens_for_user()
            .return_once(move |_| Ok(vec![stale]));
        tokens
            .expect_delete()
            .withf(move |t| *t == expected)
            .times(1)
            .returning(|_| Ok(()));
        let mut push = MockPushSender::new();
        push.expect_send().returning(|messages| {
            Ok(messages
                .iter()
                .map(|m| PushReceipt {
                    token: m.to.clone(),
                    outcome: PushOutcome::DeviceNotRegistered,
                })
                .collect())
        });

        notifier(storing(), tokens, push)
            .notify(draft(UserId::random()))
            .await
            .expect("notify");
    }

    #[rstest]
    #[tokio::test]
    async fn push_failures_do_not_fail_delivery() {
        let mut tokens = MockPushTokenRepository::new();
        tokens
            .expect_tokens_for_user()
            .return_once(|_| Ok(vec![token("one")]));
        let mut push = MockPushSender::new();
        push.expect_send()
            .return_once(|_| Err(PushSendError::transport("connection reset")));

        assert!(
            notifier(storing(), tokens, push)
                .notify(draft(UserId::random()))
                .await
                .is_ok()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn storage_failure_skips_push() {
        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_insert()
            .return_once(|_| Err(NotificationRepositoryError::connection("down")));
        let mut tokens = MockPushTokenRepository::new();
        tokens.expect_tokens_for_user().times(0);

        let err = notifier(notifications, tokens, MockPushSender::new())
            .notify(draft(UserId::random()))
            .await
            .expect_err("storage failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
