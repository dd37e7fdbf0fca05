//! Reward catalogue and inventory queries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    AchievementRepository, AchievementRepositoryError, AchievementStatus, RewardSummary,
    RewardsQuery,
};
use crate::domain::{Error, UserId};

fn map_repository_error(error: AchievementRepositoryError) -> Error {
    match error {
        AchievementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("achievement repository unavailable: {message}"))
        }
        AchievementRepositoryError::Query { message } => {
            Error::internal(format!("achievement repository error: {message}"))
        }
    }
}

/// Implements [`RewardsQuery`].
#[derive(Clone)]
pub struct RewardService<R: ?Sized> {
    achievements: Arc<R>,
}

impl<R: ?Sized> RewardService<R> {
    /// Create a reward service over the achievement store.
    pub fn new(achievements: Arc<R>) -> Self {
        Self { achievements }
    }
}

#[async_trait]
impl<R> RewardsQuery for RewardService<R>
where
    R: AchievementRepository + ?Sized,
{
    async fn list_achievements(&self, user_id: &UserId) -> Result<Vec<AchievementStatus>, Error> {
        let definitions = self
            .achievements
            .list_definitions()
            .await
            .map_err(map_repository_error)?;
        let granted: HashMap<_, _> = self
            .achievements
            .list_rewards(user_id)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .map(|earned| (earned.reward.achievement_id, earned.reward.granted_at))
            .collect();

        Ok(definitions
            .into_iter()
            .map(|definition| {
                let granted_at = granted.get(&definition.id()).copied();
                let criteria = definition.criteria();
                AchievementStatus {
                    id: definition.id(),
                    key: definition.key().to_string(),
                    name: definition.name().to_owned(),
                    description: definition.description().to_owned(),
                    reward_kind: definition.reward_kind(),
                    event_type: criteria.event_type(),
                    threshold: criteria.threshold(),
                    field: criteria.field(),
                    earned: granted_at.is_some(),
                    granted_at,
                }
            })
            .collect())
    }

    async fn list_rewards(&self, user_id: &UserId) -> Result<Vec<RewardSummary>, Error> {
        let earned = self
            .achievements
            .list_rewards(user_id)
            .await
            .map_err(map_repository_error)?;
        Ok(earned
            .into_iter()
            .map(|earned| RewardSummary {
                id: earned.reward.id,
                achievement_id: earned.reward.achievement_id,
                key: earned.definition.key().to_string(),
                name: earned.definition.name().to_owned(),
                reward_kind: earned.definition.reward_kind(),
                granted_at: earned.reward.granted_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixture_clock::FixtureClock;
    use crate::domain::ports::MockAchievementRepository;
    use crate::domain::{EarnedReward, UserReward, builtin_definitions};
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[tokio::test]
    async fn achievements_carry_earned_flags() {
        let user = UserId::random();
        let definitions = builtin_definitions().expect("catalogue");
        let first = definitions[0].clone();
        let first_id = first.id();
        let total = definitions.len();

        let mut repo = MockAchievementRepository::new();
        repo.expect_list_definitions()
            .return_once(move || Ok(definitions));
        repo.expect_list_rewards().return_once(move |user_id| {
            Ok(vec![EarnedReward {
                reward: UserReward {
                    id: Uuid::new_v4(),
                    user_id: *user_id,
                    achievement_id: first.id(),
                    granted_at: FixtureClock::default_instant(),
                },
                definition: first,
            }])
        });

        let statuses = RewardService::new(Arc::new(repo))
            .list_achievements(&user)
            .await
            .expect("list");

        assert_eq!(statuses.len(), total);
        let earned: Vec<_> = statuses.iter().filter(|s| s.earned).collect();
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].id, first_id);
        assert_eq!(earned[0].granted_at, Some(FixtureClock::default_instant()));
    }
}
