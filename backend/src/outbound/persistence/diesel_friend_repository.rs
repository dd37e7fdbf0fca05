//! PostgreSQL-backed `FriendRepository` implementation using Diesel ORM.
//!
//! A friendship is an accepted row in `friend_requests`, whichever side sent
//! it, so every "friends of" query matches both columns.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FriendRepository, FriendRepositoryError};
use crate::domain::{FriendRequest, FriendStatus, FriendSummary, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::FriendRequestRow;
use super::pool::{DbPool, PoolError};
use super::schema::{friend_requests, users};

/// Diesel-backed implementation of the friend repository port.
#[derive(Clone)]
pub struct DieselFriendRepository {
    pool: DbPool,
}

impl DieselFriendRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FriendRepositoryError {
    map_basic_pool_error(error, FriendRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FriendRepositoryError {
    if is_unique_violation(&error) {
        return FriendRepositoryError::duplicate();
    }
    map_basic_diesel_error(
        error,
        FriendRepositoryError::query,
        FriendRepositoryError::connection,
    )
}

fn row_to_request(row: FriendRequestRow) -> Result<FriendRequest, FriendRepositoryError> {
    let status: FriendStatus = row
        .status
        .parse()
        .map_err(|err| FriendRepositoryError::query(format!("stored friend request: {err}")))?;
    Ok(FriendRequest::restore(
        row.id,
        UserId::from_uuid(row.sender_id),
        UserId::from_uuid(row.receiver_id),
        status,
        row.created_at,
        row.responded_at,
    ))
}

fn request_to_row(request: &FriendRequest) -> FriendRequestRow {
    FriendRequestRow {
        id: request.id(),
        sender_id: *request.sender_id().as_uuid(),
        receiver_id: *request.receiver_id().as_uuid(),
        status: request.status().as_str().to_owned(),
        created_at: request.created_at(),
        responded_at: request.responded_at(),
    }
}

/// The other side of an accepted request row.
fn peer_of(row: &FriendRequestRow, user: Uuid) -> Uuid {
    if row.sender_id == user {
        row.receiver_id
    } else {
        row.sender_id
    }
}

impl DieselFriendRepository {
    async fn accepted_rows(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FriendRequestRow>, FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = *user_id.as_uuid();

        friend_requests::table
            .filter(friend_requests::status.eq(FriendStatus::Accepted.as_str()))
            .filter(
                friend_requests::sender_id
                    .eq(user)
                    .or(friend_requests::receiver_id.eq(user)),
            )
            .select(FriendRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl FriendRepository for DieselFriendRepository {
    async fn find_request(
        &self,
        sender_id: &UserId,
        receiver_id: &UserId,
    ) -> Result<Option<FriendRequest>, FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = friend_requests::table
            .filter(friend_requests::sender_id.eq(sender_id.as_uuid()))
            .filter(friend_requests::receiver_id.eq(receiver_id.as_uuid()))
            .select(FriendRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_request).transpose()
    }

    async fn find_by_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<FriendRequest>, FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = friend_requests::table
            .filter(friend_requests::id.eq(request_id))
            .select(FriendRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_request).transpose()
    }

    async fn insert(&self, request: &FriendRequest) -> Result<(), FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(friend_requests::table)
            .values(&request_to_row(request))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_status(&self, request: &FriendRequest) -> Result<(), FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(friend_requests::table.find(request.id()))
            .set((
                friend_requests::status.eq(request.status().as_str()),
                friend_requests::responded_at.eq(request.responded_at()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(FriendRepositoryError::query("friend request not found"));
        }
        Ok(())
    }

    async fn delete(&self, request_id: Uuid) -> Result<(), FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(friend_requests::table.find(request_id))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_friends(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FriendSummary>, FriendRepositoryError> {
        let rows = self.accepted_rows(user_id).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let me = *user_id.as_uuid();
        let peer_ids: Vec<Uuid> = rows.iter().map(|row| peer_of(row, me)).collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let names: HashMap<Uuid, String> = users::table
            .filter(users::id.eq_any(peer_ids))
            .select((users::id, users::display_name))
            .load::<(Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        let mut friends: Vec<FriendSummary> = rows
            .iter()
            .map(|row| {
                let peer = peer_of(row, me);
                FriendSummary {
                    user_id: UserId::from_uuid(peer),
                    display_name: names.get(&peer).cloned().unwrap_or_default(),
                    since: row.responded_at.unwrap_or(row.created_at),
                }
            })
            .collect();
        friends.sort_by(|a, b| b.since.cmp(&a.since));
        Ok(friends)
    }

    async fn list_incoming_pending(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FriendRequest>, FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FriendRequestRow> = friend_requests::table
            .filter(friend_requests::receiver_id.eq(user_id.as_uuid()))
            .filter(friend_requests::status.eq(FriendStatus::Pending.as_str()))
            .order(friend_requests::created_at.desc())
            .select(FriendRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_request).collect()
    }

    async fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool, FriendRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (a, b) = (*a.as_uuid(), *b.as_uuid());

        let count: i64 = friend_requests::table
            .filter(friend_requests::status.eq(FriendStatus::Accepted.as_str()))
            .filter(
                friend_requests::sender_id
                    .eq(a)
                    .and(friend_requests::receiver_id.eq(b))
                    .or(friend_requests::sender_id
                        .eq(b)
                        .and(friend_requests::receiver_id.eq(a))),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }

    async fn friend_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, FriendRepositoryError> {
        let me = *user_id.as_uuid();
        Ok(self
            .accepted_rows(user_id)
            .await?
            .iter()
            .map(|row| UserId::from_uuid(peer_of(row, me)))
            .collect())
    }
}
