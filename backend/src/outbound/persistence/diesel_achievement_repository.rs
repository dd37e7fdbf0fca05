//! PostgreSQL-backed `AchievementRepository` implementation using Diesel ORM.
//!
//! Definitions are few and read on every evaluated event, so filtering by
//! event type happens after decoding rather than in SQL over `jsonb`. Rows
//! whose criteria no longer decode are skipped with a warning so one bad
//! definition cannot block the rest of the catalogue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{AchievementRepository, AchievementRepositoryError};
use crate::domain::{
    AchievementCriteria, AchievementDefinition, AchievementDefinitionDraft, EarnedReward,
    EventType, RewardGrant, RewardKind, UserId, UserReward,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AchievementDefinitionRow, NewAchievementDefinitionRow, UserRewardRow};
use super::pool::{DbPool, PoolError};
use super::schema::{achievement_definitions, user_rewards};

/// Diesel-backed implementation of the achievement repository port.
#[derive(Clone)]
pub struct DieselAchievementRepository {
    pool: DbPool,
}

impl DieselAchievementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AchievementRepositoryError {
    map_basic_pool_error(error, AchievementRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AchievementRepositoryError {
    map_basic_diesel_error(
        error,
        AchievementRepositoryError::query,
        AchievementRepositoryError::connection,
    )
}

fn row_to_definition(row: AchievementDefinitionRow) -> Result<AchievementDefinition, String> {
    let reward_kind: RewardKind = row.reward_kind.parse().map_err(|err| format!("{err}"))?;
    let criteria: AchievementCriteria =
        serde_json::from_value(row.criteria).map_err(|err| format!("criteria: {err}"))?;
    AchievementDefinition::new(AchievementDefinitionDraft {
        id: row.id,
        key: row.key,
        reward_kind,
        name: row.name,
        description: row.description,
        criteria,
    })
    .map_err(|err| err.to_string())
}

/// Decode rows, dropping the ones that fail validation.
fn decode_definitions(rows: Vec<AchievementDefinitionRow>) -> Vec<AchievementDefinition> {
    rows.into_iter()
        .filter_map(|row| {
            let (id, key) = (row.id, row.key.clone());
            match row_to_definition(row) {
                Ok(definition) => Some(definition),
                Err(reason) => {
                    warn!(%id, %key, %reason, "skipping undecodable achievement definition");
                    None
                }
            }
        })
        .collect()
}

fn reward_from_row(row: UserRewardRow) -> UserReward {
    UserReward {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        achievement_id: row.achievement_id,
        granted_at: row.granted_at,
    }
}

impl DieselAchievementRepository {
    async fn load_definitions(&self) -> Result<Vec<AchievementDefinition>, AchievementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AchievementDefinitionRow> = achievement_definitions::table
            .order(achievement_definitions::key.asc())
            .select(AchievementDefinitionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(decode_definitions(rows))
    }
}

#[async_trait]
impl AchievementRepository for DieselAchievementRepository {
    async fn upsert_definitions(
        &self,
        definitions: &[AchievementDefinition],
    ) -> Result<(), AchievementRepositoryError> {
        if definitions.is_empty() {
            return Ok(());
        }
        let rows = definitions
            .iter()
            .map(|definition| {
                let criteria = serde_json::to_value(definition.criteria()).map_err(|err| {
                    AchievementRepositoryError::query(format!("serialise criteria: {err}"))
                })?;
                Ok(NewAchievementDefinitionRow {
                    id: definition.id(),
                    key: definition.key().as_str(),
                    reward_kind: definition.reward_kind().as_str(),
                    name: definition.name(),
                    description: definition.description(),
                    criteria,
                })
            })
            .collect::<Result<Vec<_>, AchievementRepositoryError>>()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Keyed by `key`: the id of an existing row is kept so granted
        // rewards stay attached.
        diesel::insert_into(achievement_definitions::table)
            .values(&rows)
            .on_conflict(achievement_definitions::key)
            .do_update()
            .set((
                achievement_definitions::reward_kind
                    .eq(excluded(achievement_definitions::reward_kind)),
                achievement_definitions::name.eq(excluded(achievement_definitions::name)),
                achievement_definitions::description
                    .eq(excluded(achievement_definitions::description)),
                achievement_definitions::criteria.eq(excluded(achievement_definitions::criteria)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_definitions(
        &self,
    ) -> Result<Vec<AchievementDefinition>, AchievementRepositoryError> {
        self.load_definitions().await
    }

    async fn definitions_for_event(
        &self,
        event_type: EventType,
    ) -> Result<Vec<AchievementDefinition>, AchievementRepositoryError> {
        Ok(self
            .load_definitions()
            .await?
            .into_iter()
            .filter(|definition| definition.criteria().event_type() == event_type)
            .collect())
    }

    async fn earned_achievement_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, AchievementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        user_rewards::table
            .filter(user_rewards::user_id.eq(user_id.as_uuid()))
            .select(user_rewards::achievement_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn grant_reward(
        &self,
        user_id: &UserId,
        achievement_id: Uuid,
        granted_at: DateTime<Utc>,
    ) -> Result<RewardGrant, AchievementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserRewardRow {
            id: Uuid::new_v4(),
            user_id: *user_id.as_uuid(),
            achievement_id,
            granted_at,
        };

        let inserted = diesel::insert_into(user_rewards::table)
            .values(&row)
            .on_conflict((user_rewards::user_id, user_rewards::achievement_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if inserted == 0 {
            RewardGrant::AlreadyGranted
        } else {
            RewardGrant::Granted(reward_from_row(row))
        })
    }

    async fn list_rewards(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EarnedReward>, AchievementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(UserRewardRow, AchievementDefinitionRow)> = user_rewards::table
            .inner_join(achievement_definitions::table)
            .filter(user_rewards::user_id.eq(user_id.as_uuid()))
            .order(user_rewards::granted_at.desc())
            .select((
                UserRewardRow::as_select(),
                AchievementDefinitionRow::as_select(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(reward, definition)| {
                let key = definition.key.clone();
                match row_to_definition(definition) {
                    Ok(definition) => Some(EarnedReward {
                        reward: reward_from_row(reward),
                        definition,
                    }),
                    Err(reason) => {
                        warn!(%key, %reason, "skipping reward with undecodable definition");
                        None
                    }
                }
            })
            .collect())
    }
}
