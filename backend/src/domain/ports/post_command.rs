//! Driving ports for posts, the feed and reactions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, FeedKey, Post, PostDetail, ReactionToggle, UserId, Visibility};

/// Request to publish a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub author_id: UserId,
    pub content: String,
    pub visibility: Visibility,
    pub images: Vec<String>,
}

/// Request for one page of the caller's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest {
    pub viewer_id: UserId,
    /// Continue after this position; `None` starts from the newest post.
    pub after: Option<FeedKey>,
    /// Page size, already bounded by the caller.
    pub limit: usize,
}

/// One page of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    /// Position of the last post when more posts follow.
    pub next: Option<FeedKey>,
}

/// Post write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Validate and persist a post, then announce `post.created`.
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error>;

    /// Delete a post. Only its author may do so.
    async fn delete_post(&self, user_id: &UserId, post_id: Uuid) -> Result<(), Error>;

    /// Add the caller's reaction when absent, remove it when present.
    async fn toggle_reaction(
        &self,
        user_id: &UserId,
        post_id: Uuid,
        emoji: String,
    ) -> Result<ReactionToggle, Error>;
}

/// Post read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// A post the viewer may see, with reaction tallies.
    async fn get_post(&self, viewer_id: &UserId, post_id: Uuid) -> Result<PostDetail, Error>;

    /// The viewer's own posts and their friends' posts, newest first.
    async fn list_feed(&self, request: FeedRequest) -> Result<FeedPage, Error>;
}
