//! Port for posts and their reactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Emoji, FeedKey, Post, ReactionCount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post.
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Fetch a post by id.
    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>, PostRepositoryError>;

    /// Delete a post and its reactions. Returns whether a row was removed.
    async fn delete(&self, post_id: Uuid) -> Result<bool, PostRepositoryError>;

    /// Posts by any of `authors`, newest first, strictly after `before` when
    /// given, at most `limit` rows.
    async fn feed_page(
        &self,
        authors: &[UserId],
        before: Option<FeedKey>,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError>;

    /// Record a reaction. Returns `false` when the same reaction existed.
    async fn add_reaction(
        &self,
        post_id: Uuid,
        user_id: &UserId,
        emoji: &Emoji,
        reacted_at: DateTime<Utc>,
    ) -> Result<bool, PostRepositoryError>;

    /// Remove a reaction. Returns `false` when it did not exist.
    async fn remove_reaction(
        &self,
        post_id: Uuid,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<bool, PostRepositoryError>;

    /// Reaction tallies for a post, most used first.
    async fn reaction_counts(&self, post_id: Uuid)
    -> Result<Vec<ReactionCount>, PostRepositoryError>;
}
