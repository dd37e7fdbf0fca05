//! PostgreSQL-backed `ActivityStatsRepository`: one `COUNT(*)` per field.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ActivityStatsRepository, ActivityStatsRepositoryError};
use crate::domain::{FriendStatus, StatField, UserId};

use super::diesel_basic_error_mapping::{count_to_u64, map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{friend_requests, messages, mood_entries, post_reactions, posts};

/// Diesel-backed counters feeding the achievement evaluator.
#[derive(Clone)]
pub struct DieselActivityStatsRepository {
    pool: DbPool,
}

impl DieselActivityStatsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ActivityStatsRepositoryError {
    map_basic_pool_error(error, ActivityStatsRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ActivityStatsRepositoryError {
    map_basic_diesel_error(
        error,
        ActivityStatsRepositoryError::query,
        ActivityStatsRepositoryError::connection,
    )
}

#[async_trait]
impl ActivityStatsRepository for DieselActivityStatsRepository {
    async fn count(
        &self,
        user_id: &UserId,
        field: StatField,
    ) -> Result<u64, ActivityStatsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = *user_id.as_uuid();

        let count: i64 = match field {
            StatField::PostCount => {
                posts::table
                    .filter(posts::author_id.eq(user))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            StatField::MoodCount => {
                mood_entries::table
                    .filter(mood_entries::user_id.eq(user))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            StatField::FriendCount => {
                friend_requests::table
                    .filter(friend_requests::status.eq(FriendStatus::Accepted.as_str()))
                    .filter(
                        friend_requests::sender_id
                            .eq(user)
                            .or(friend_requests::receiver_id.eq(user)),
                    )
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            StatField::ReactionsGiven => {
                post_reactions::table
                    .filter(post_reactions::user_id.eq(user))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            StatField::ReactionsReceived => {
                post_reactions::table
                    .inner_join(posts::table)
                    .filter(posts::author_id.eq(user))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            StatField::MessagesSent => {
                messages::table
                    .filter(messages::sender_id.eq(user))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(count_to_u64(count))
    }
}
