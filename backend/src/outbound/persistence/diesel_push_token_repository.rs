//! PostgreSQL-backed `PushTokenRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{PushTokenRepository, PushTokenRepositoryError};
use crate::domain::{PushToken, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewPushTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::push_tokens;

/// Diesel-backed implementation of the push token repository port.
#[derive(Clone)]
pub struct DieselPushTokenRepository {
    pool: DbPool,
}

impl DieselPushTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PushTokenRepositoryError {
    map_basic_pool_error(error, PushTokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PushTokenRepositoryError {
    map_basic_diesel_error(
        error,
        PushTokenRepositoryError::query,
        PushTokenRepositoryError::connection,
    )
}

#[async_trait]
impl PushTokenRepository for DieselPushTokenRepository {
    async fn upsert(
        &self,
        token: &PushToken,
        user_id: &UserId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), PushTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPushTokenRow {
            token: token.as_str(),
            user_id: *user_id.as_uuid(),
            registered_at,
        };

        // A device that signs in as someone else moves to the new account.
        diesel::insert_into(push_tokens::table)
            .values(&row)
            .on_conflict(push_tokens::token)
            .do_update()
            .set((
                push_tokens::user_id.eq(excluded(push_tokens::user_id)),
                push_tokens::registered_at.eq(excluded(push_tokens::registered_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_for_user(
        &self,
        token: &PushToken,
        user_id: &UserId,
    ) -> Result<bool, PushTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            push_tokens::table
                .filter(push_tokens::token.eq(token.as_str()))
                .filter(push_tokens::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete(&self, token: &PushToken) -> Result<(), PushTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(push_tokens::table.find(token.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn tokens_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PushToken>, PushTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let raw: Vec<String> = push_tokens::table
            .filter(push_tokens::user_id.eq(user_id.as_uuid()))
            .order(push_tokens::registered_at.desc())
            .select(push_tokens::token)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(raw
            .into_iter()
            .filter_map(|token| match PushToken::new(token) {
                Ok(token) => Some(token),
                Err(error) => {
                    warn!(%user_id, %error, "skipping malformed stored push token");
                    None
                }
            })
            .collect())
    }
}
