//! Driving port for the reward catalogue and a user's rewards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, EventType, RewardKind, StatField, UserId};

/// An achievement and whether the caller has earned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    pub id: Uuid,
    #[schema(example = "first_post")]
    pub key: String,
    pub name: String,
    pub description: String,
    pub reward_kind: RewardKind,
    pub event_type: EventType,
    pub threshold: u32,
    pub field: StatField,
    pub earned: bool,
    pub granted_at: Option<DateTime<Utc>>,
}

/// A reward the caller holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardSummary {
    pub id: Uuid,
    pub achievement_id: Uuid,
    pub key: String,
    pub name: String,
    pub reward_kind: RewardKind,
    pub granted_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardsQuery: Send + Sync {
    /// Every definition, ordered by key, flagged with the caller's progress.
    async fn list_achievements(&self, user_id: &UserId) -> Result<Vec<AchievementStatus>, Error>;

    /// The caller's rewards, newest first.
    async fn list_rewards(&self, user_id: &UserId) -> Result<Vec<RewardSummary>, Error>;
}
