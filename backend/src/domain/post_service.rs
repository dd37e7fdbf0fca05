//! Post, feed and reaction service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CreatePostRequest, EventPublisher, FeedPage, FeedRequest, FriendRepository,
    FriendRepositoryError, PostCommand, PostQuery, PostRepository, PostRepositoryError,
};
use crate::domain::validation::invalid_field;
use crate::domain::{
    DomainEvent, Emoji, Error, Post, PostDetail, PostDraft, ReactionToggle, UserId, Visibility,
};

fn map_post_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("post repository unavailable: {message}"))
        }
        PostRepositoryError::Query { message } => {
            Error::internal(format!("post repository error: {message}"))
        }
    }
}

fn map_friend_error(error: FriendRepositoryError) -> Error {
    match error {
        FriendRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("friend repository unavailable: {message}"))
        }
        other => Error::internal(format!("friend repository error: {other}")),
    }
}

fn post_not_found(post_id: Uuid) -> Error {
    Error::not_found(format!("post {post_id} not found"))
}

/// Post service implementing [`PostCommand`] and [`PostQuery`].
#[derive(Clone)]
pub struct PostService<P: ?Sized, F: ?Sized> {
    posts: Arc<P>,
    friends: Arc<F>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl<P: ?Sized, F: ?Sized> PostService<P, F> {
    /// Create a post service; `friends` decides private post visibility.
    pub fn new(
        posts: Arc<P>,
        friends: Arc<F>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            friends,
            events,
            clock,
        }
    }
}

impl<P, F> PostService<P, F>
where
    P: PostRepository + ?Sized,
    F: FriendRepository + ?Sized,
{
    /// Load a post the viewer may read. Hidden posts look missing.
    async fn visible_post(&self, viewer_id: &UserId, post_id: Uuid) -> Result<Post, Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| post_not_found(post_id))?;

        if post.visibility() == Visibility::Public || post.author_id() == viewer_id {
            return Ok(post);
        }
        let friends = self
            .friends
            .are_friends(viewer_id, post.author_id())
            .await
            .map_err(map_friend_error)?;
        if friends {
            Ok(post)
        } else {
            Err(post_not_found(post_id))
        }
    }

    async fn reaction_count(&self, post_id: Uuid, emoji: &Emoji) -> Result<u64, Error> {
        let counts = self
            .posts
            .reaction_counts(post_id)
            .await
            .map_err(map_post_error)?;
        Ok(counts
            .into_iter()
            .find(|tally| &tally.emoji == emoji)
            .map_or(0, |tally| tally.count))
    }
}

#[async_trait]
impl<P, F> PostCommand for PostService<P, F>
where
    P: PostRepository + ?Sized,
    F: FriendRepository + ?Sized,
{
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error> {
        let post = Post::new(PostDraft {
            id: Uuid::new_v4(),
            author_id: request.author_id,
            content: request.content,
            visibility: request.visibility,
            images: request.images,
            created_at: self.clock.utc(),
        })
        .map_err(|err| invalid_field(&err))?;

        self.posts.insert(&post).await.map_err(map_post_error)?;
        self.events
            .publish(&DomainEvent::PostCreated {
                post_id: post.id(),
                author_id: *post.author_id(),
            })
            .await;
        Ok(post)
    }

    async fn delete_post(&self, user_id: &UserId, post_id: Uuid) -> Result<(), Error> {
        let post = self.visible_post(user_id, post_id).await?;
        if post.author_id() != user_id {
            return Err(Error::forbidden("only the author can delete a post"));
        }
        let removed = self.posts.delete(post_id).await.map_err(map_post_error)?;
        if !removed {
            return Err(post_not_found(post_id));
        }
        Ok(())
    }

    async fn toggle_reaction(
        &self,
        user_id: &UserId,
        post_id: Uuid,
        emoji: String,
    ) -> Result<ReactionToggle, Error> {
        let emoji = Emoji::new(emoji).map_err(|err| invalid_field(&err))?;
        let post = self.visible_post(user_id, post_id).await?;

        let removed = self
            .posts
            .remove_reaction(post_id, user_id, &emoji)
            .await
            .map_err(map_post_error)?;
        let added = if removed {
            false
        } else {
            let inserted = self
                .posts
                .add_reaction(post_id, user_id, &emoji, self.clock.utc())
                .await
                .map_err(map_post_error)?;
            if inserted {
                self.events
                    .publish(&DomainEvent::ReactionAdded {
                        post_id,
                        post_author_id: *post.author_id(),
                        reactor_id: *user_id,
                        emoji: emoji.to_string(),
                    })
                    .await;
            } else {
                debug!(%post_id, %user_id, "reaction added concurrently");
            }
            true
        };

        let count = self.reaction_count(post_id, &emoji).await?;
        Ok(ReactionToggle {
            emoji,
            added,
            count,
        })
    }
}

#[async_trait]
impl<P, F> PostQuery for PostService<P, F>
where
    P: PostRepository + ?Sized,
    F: FriendRepository + ?Sized,
{
    async fn get_post(&self, viewer_id: &UserId, post_id: Uuid) -> Result<PostDetail, Error> {
        let post = self.visible_post(viewer_id, post_id).await?;
        let reactions = self
            .posts
            .reaction_counts(post_id)
            .await
            .map_err(map_post_error)?;
        Ok(PostDetail { post, reactions })
    }

    async fn list_feed(&self, request: FeedRequest) -> Result<FeedPage, Error> {
        let mut authors = self
            .friends
            .friend_ids(&request.viewer_id)
            .await
            .map_err(map_friend_error)?;
        authors.push(request.viewer_id);

        let mut posts = self
            .posts
            .feed_page(&authors, request.after, request.limit.saturating_add(1))
            .await
            .map_err(map_post_error)?;

        let next = if posts.len() > request.limit {
            posts.truncate(request.limit);
            posts.last().map(Post::feed_key)
        } else {
            None
        };
        Ok(FeedPage { posts, next })
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
