//! Port for friend requests and the friendships they form.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{FriendRequest, FriendSummary, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by friend repository adapters.
    pub enum FriendRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "friend repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "friend repository query failed: {message}",
        /// A request for the same sender and receiver already exists.
        Duplicate => "friend request already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendRepository: Send + Sync {
    /// The request sent by `sender_id` to `receiver_id`, if any. Direction
    /// matters.
    async fn find_request(
        &self,
        sender_id: &UserId,
        receiver_id: &UserId,
    ) -> Result<Option<FriendRequest>, FriendRepositoryError>;

    /// Fetch a request by id.
    async fn find_by_id(&self, request_id: Uuid)
    -> Result<Option<FriendRequest>, FriendRepositoryError>;

    /// Persist a new request; [`FriendRepositoryError::Duplicate`] when the
    /// directed pair already exists or the reverse request is still open or
    /// accepted.
    async fn insert(&self, request: &FriendRequest) -> Result<(), FriendRepositoryError>;

    /// Store a new status and response time.
    async fn update_status(&self, request: &FriendRequest) -> Result<(), FriendRepositoryError>;

    /// Remove a request.
    async fn delete(&self, request_id: Uuid) -> Result<(), FriendRepositoryError>;

    /// Accepted friendships of `user_id`, most recent first.
    async fn list_friends(&self, user_id: &UserId)
    -> Result<Vec<FriendSummary>, FriendRepositoryError>;

    /// Pending requests addressed to `user_id`, newest first.
    async fn list_incoming_pending(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FriendRequest>, FriendRepositoryError>;

    /// Whether an accepted request exists in either direction.
    async fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool, FriendRepositoryError>;

    /// Ids of every accepted friend of `user_id`.
    async fn friend_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, FriendRepositoryError>;
}
