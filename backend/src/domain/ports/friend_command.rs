//! Driving ports for friend requests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, FriendRequest, FriendSummary, UserId};

/// Friend request write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendCommand: Send + Sync {
    /// Ask `receiver_id` to be friends.
    ///
    /// A pending request from the receiver is accepted instead of opening a
    /// second one.
    async fn send_request(
        &self,
        sender_id: &UserId,
        receiver_id: &UserId,
    ) -> Result<FriendRequest, Error>;

    /// Accept or reject a pending request addressed to `user_id`.
    async fn respond(
        &self,
        user_id: &UserId,
        request_id: Uuid,
        accept: bool,
    ) -> Result<FriendRequest, Error>;
}

/// Friend read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendQuery: Send + Sync {
    async fn list_friends(&self, user_id: &UserId) -> Result<Vec<FriendSummary>, Error>;

    /// Incoming pending requests.
    async fn list_pending(&self, user_id: &UserId) -> Result<Vec<FriendRequest>, Error>;
}
