//! Achievement evaluation.
//!
//! For every definition triggered by the event type, a definition the user
//! has not earned yet costs one count query; a met threshold costs one
//! conditional insert. Already-earned definitions are never re-counted.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    AchievementRepository, AchievementRepositoryError, ActivityStatsRepository,
    ActivityStatsRepositoryError, EvaluateAchievements,
};
use crate::domain::{Error, EventType, GrantedReward, RewardGrant, UserId};

fn map_achievement_error(error: AchievementRepositoryError) -> Error {
    match error {
        AchievementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("achievement repository unavailable: {message}"))
        }
        AchievementRepositoryError::Query { message } => {
            Error::internal(format!("achievement repository error: {message}"))
        }
    }
}

fn map_stats_error(error: ActivityStatsRepositoryError) -> Error {
    match error {
        ActivityStatsRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("activity stats unavailable: {message}"))
        }
        ActivityStatsRepositoryError::Query { message } => {
            Error::internal(format!("activity stats error: {message}"))
        }
    }
}

/// Evaluates achievement definitions against per-user counters.
#[derive(Clone)]
pub struct AchievementEvaluator<A: ?Sized, S: ?Sized> {
    achievements: Arc<A>,
    stats: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<A: ?Sized, S: ?Sized> AchievementEvaluator<A, S> {
    /// Create an evaluator over the given repositories.
    pub fn new(achievements: Arc<A>, stats: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            achievements,
            stats,
            clock,
        }
    }
}

#[async_trait]
impl<A, S> EvaluateAchievements for AchievementEvaluator<A, S>
where
    A: AchievementRepository + ?Sized,
    S: ActivityStatsRepository + ?Sized,
{
    async fn evaluate(
        &self,
        user_id: &UserId,
        event_type: EventType,
    ) -> Result<Vec<GrantedReward>, Error> {
        let definitions = self
            .achievements
            .definitions_for_event(event_type)
            .await
            .map_err(map_achievement_error)?;
        if definitions.is_empty() {
            return Ok(Vec::new());
        }

        let earned: HashSet<_> = self
            .achievements
            .earned_achievement_ids(user_id)
            .await
            .map_err(map_achievement_error)?
            .into_iter()
            .collect();

        let mut granted = Vec::new();
        for definition in definitions {
            if earned.contains(&definition.id()) {
                continue;
            }

            let criteria = definition.criteria();
            let value = self
                .stats
                .count(user_id, criteria.field())
                .await
                .map_err(map_stats_error)?;
            if !criteria.is_met_by(value) {
                continue;
            }

            let outcome = self
                .achievements
                .grant_reward(user_id, definition.id(), self.clock.utc())
                .await
                .map_err(map_achievement_error)?;
            match outcome {
                RewardGrant::Granted(reward) => {
                    info!(
                        user_id = %user_id,
                        achievement = %definition.key(),
                        "achievement granted"
                    );
                    granted.push(GrantedReward {
                        achievement_id: definition.id(),
                        key: definition.key().clone(),
                        reward_kind: definition.reward_kind(),
                        name: definition.name().to_owned(),
                        granted_at: reward.granted_at,
                    });
                }
                RewardGrant::AlreadyGranted => {
                    debug!(
                        user_id = %user_id,
                        achievement = %definition.key(),
                        "achievement granted concurrently"
                    );
                }
            }
        }

        Ok(granted)
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
