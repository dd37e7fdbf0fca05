//! Event handler that turns domain events into achievement evaluations.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{EvaluateAchievements, EventHandler, UserNotifier};
use crate::domain::{
    DomainEvent, Error, GrantedReward, NotificationDraft, NotificationKind, UserId,
};

/// Evaluates achievements for every user an event implicates and notifies
/// them of new rewards.
pub struct GamificationHandler<E: ?Sized> {
    evaluator: Arc<E>,
    notifier: Arc<dyn UserNotifier>,
}

impl<E: ?Sized> GamificationHandler<E> {
    /// Create a handler that reports rewards through `notifier`.
    pub fn new(evaluator: Arc<E>, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            evaluator,
            notifier,
        }
    }
}

fn reward_notification(user_id: UserId, reward: &GrantedReward) -> NotificationDraft {
    NotificationDraft {
        user_id,
        kind: NotificationKind::RewardEarned,
        title: "Reward unlocked".to_owned(),
        body: format!("You earned the {} {}!", reward.name, reward.reward_kind.as_str()),
        data: json!({
            "achievementId": reward.achievement_id,
            "key": reward.key,
            "rewardKind": reward.reward_kind,
        }),
    }
}

impl<E> GamificationHandler<E>
where
    E: EvaluateAchievements + ?Sized,
{
    async fn reward_user(&self, user_id: UserId, event: &DomainEvent) -> Result<(), Error> {
        let granted = self.evaluator.evaluate(&user_id, event.event_type()).await?;
        let mut first_error = None;
        for reward in &granted {
            if let Err(error) = self
                .notifier
                .notify(reward_notification(user_id, reward))
                .await
            {
                warn!(%user_id, achievement = %reward.key, %error, "reward notification failed");
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl<E> EventHandler for GamificationHandler<E>
where
    E: EvaluateAchievements + ?Sized,
{
    fn name(&self) -> &'static str {
        "gamification"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), Error> {
        let mut first_error = None;
        for user_id in event.implicated_users() {
            if let Err(error) = self.reward_user(user_id, event).await {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
