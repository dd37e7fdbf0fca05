//! Port for achievement definitions and granted rewards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AchievementDefinition, EarnedReward, EventType, RewardGrant, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by achievement repository adapters.
    pub enum AchievementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "achievement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "achievement repository query failed: {message}",
    }
}

/// Storage for the achievement catalogue and per-user rewards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Insert or update definitions, matching on key.
    async fn upsert_definitions(
        &self,
        definitions: &[AchievementDefinition],
    ) -> Result<(), AchievementRepositoryError>;

    /// Every decodable definition, ordered by key.
    ///
    /// Rows whose criteria cannot be decoded are skipped with a warning.
    async fn list_definitions(
        &self,
    ) -> Result<Vec<AchievementDefinition>, AchievementRepositoryError>;

    /// Definitions whose criteria name `event_type`.
    async fn definitions_for_event(
        &self,
        event_type: EventType,
    ) -> Result<Vec<AchievementDefinition>, AchievementRepositoryError>;

    /// Ids of achievements the user has already earned.
    async fn earned_achievement_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, AchievementRepositoryError>;

    /// Record a reward unless one already exists for the pair.
    ///
    /// Must be atomic with respect to concurrent grants: at most one caller
    /// observes [`RewardGrant::Granted`].
    async fn grant_reward(
        &self,
        user_id: &UserId,
        achievement_id: Uuid,
        granted_at: DateTime<Utc>,
    ) -> Result<RewardGrant, AchievementRepositoryError>;

    /// The user's rewards joined with their definitions, newest first.
    async fn list_rewards(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EarnedReward>, AchievementRepositoryError>;
}
