//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.
//!
//! Feed pages use keyset pagination over `(created_at, id)`, both
//! descending, so a page never repeats or skips a post that existed when the
//! cursor was issued.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{Emoji, FeedKey, Post, PostDraft, ReactionCount, UserId, Visibility};

use super::diesel_basic_error_mapping::{
    count_to_u64, limit_to_i64, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewReactionRow, PostRow};
use super::pool::{DbPool, PoolError};
use super::schema::{post_reactions, posts};

/// Diesel-backed implementation of the post repository port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostRepositoryError {
    map_basic_pool_error(error, PostRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PostRepositoryError {
    map_basic_diesel_error(
        error,
        PostRepositoryError::query,
        PostRepositoryError::connection,
    )
}

fn row_to_post(row: PostRow) -> Result<Post, PostRepositoryError> {
    let visibility: Visibility = row
        .visibility
        .parse()
        .map_err(|err| PostRepositoryError::query(format!("stored post: {err}")))?;
    Post::new(PostDraft {
        id: row.id,
        author_id: UserId::from_uuid(row.author_id),
        content: row.content,
        visibility,
        images: row.images,
        created_at: row.created_at,
    })
    .map_err(|err| PostRepositoryError::query(format!("stored post: {err}")))
}

fn post_to_row(post: &Post) -> PostRow {
    PostRow {
        id: post.id(),
        author_id: *post.author_id().as_uuid(),
        content: post.content().to_owned(),
        visibility: post.visibility().as_str().to_owned(),
        images: post.images().to_vec(),
        created_at: post.created_at(),
    }
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(posts::table)
            .values(&post_to_row(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = posts::table
            .filter(posts::id.eq(post_id))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_post).transpose()
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(posts::table.filter(posts::id.eq(post_id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn feed_page(
        &self,
        authors: &[UserId],
        before: Option<FeedKey>,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        if authors.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let author_ids: Vec<Uuid> = authors.iter().map(|id| *id.as_uuid()).collect();

        let mut query = posts::table
            .filter(posts::author_id.eq_any(author_ids))
            .select(PostRow::as_select())
            .into_boxed();
        if let Some(key) = before {
            query = query.filter(
                posts::created_at.lt(key.created_at).or(posts::created_at
                    .eq(key.created_at)
                    .and(posts::id.lt(key.id))),
            );
        }

        let rows: Vec<PostRow> = query
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit_to_i64(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_post).collect()
    }

    async fn add_reaction(
        &self,
        post_id: Uuid,
        user_id: &UserId,
        emoji: &Emoji,
        reacted_at: DateTime<Utc>,
    ) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReactionRow {
            post_id,
            user_id: *user_id.as_uuid(),
            emoji: emoji.as_str(),
            created_at: reacted_at,
        };

        let inserted = diesel::insert_into(post_reactions::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn remove_reaction(
        &self,
        post_id: Uuid,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            post_reactions::table
                .filter(post_reactions::post_id.eq(post_id))
                .filter(post_reactions::user_id.eq(user_id.as_uuid()))
                .filter(post_reactions::emoji.eq(emoji.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn reaction_counts(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<ReactionCount>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(String, i64)> = post_reactions::table
            .filter(post_reactions::post_id.eq(post_id))
            .group_by(post_reactions::emoji)
            .select((post_reactions::emoji, diesel::dsl::count_star()))
            .order((diesel::dsl::count_star().desc(), post_reactions::emoji.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(emoji, count)| {
                let emoji = Emoji::new(emoji)
                    .map_err(|err| PostRepositoryError::query(format!("stored reaction: {err}")))?;
                Ok(ReactionCount {
                    emoji,
                    count: count_to_u64(count),
                })
            })
            .collect()
    }
}
