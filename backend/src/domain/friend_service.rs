//! Friend request service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    EventPublisher, FriendCommand, FriendQuery, FriendRepository, FriendRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::validation::invalid_field;
use crate::domain::{
    DomainEvent, Error, FriendRequest, FriendRequestError, FriendStatus, FriendSummary, UserId,
};

fn map_friend_error(error: FriendRepositoryError) -> Error {
    match error {
        FriendRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("friend repository unavailable: {message}"))
        }
        FriendRepositoryError::Query { message } => {
            Error::internal(format!("friend repository error: {message}"))
        }
        FriendRepositoryError::Duplicate => Error::conflict("friend request already exists"),
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_transition_error(error: FriendRequestError) -> Error {
    match error {
        FriendRequestError::NotPending(status) => {
            Error::conflict(format!("friend request has already been {status}"))
        }
        other => invalid_field(&other),
    }
}

/// Friend service implementing [`FriendCommand`] and [`FriendQuery`].
#[derive(Clone)]
pub struct FriendService<F: ?Sized, U: ?Sized> {
    friends: Arc<F>,
    users: Arc<U>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl<F: ?Sized, U: ?Sized> FriendService<F, U> {
    /// Create a friend service; `users` resolves request targets.
    pub fn new(
        friends: Arc<F>,
        users: Arc<U>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            friends,
            users,
            events,
            clock,
        }
    }
}

impl<F, U> FriendService<F, U>
where
    F: FriendRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn accept(&self, request: FriendRequest) -> Result<FriendRequest, Error> {
        let accepted = request
            .respond(true, self.clock.utc())
            .map_err(map_transition_error)?;
        let already_friends = self
            .friends
            .are_friends(accepted.sender_id(), accepted.receiver_id())
            .await
            .map_err(map_friend_error)?;
        if already_friends {
            return Err(Error::conflict("you are already friends"));
        }
        self.friends
            .update_status(&accepted)
            .await
            .map_err(map_friend_error)?;
        info!(request_id = %accepted.id(), "friend request accepted");
        self.events
            .publish(&DomainEvent::FriendAccepted {
                request_id: accepted.id(),
                requester_id: *accepted.sender_id(),
                accepter_id: *accepted.receiver_id(),
            })
            .await;
        Ok(accepted)
    }
}

#[async_trait]
impl<F, U> FriendCommand for FriendService<F, U>
where
    F: FriendRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn send_request(
        &self,
        sender_id: &UserId,
        receiver_id: &UserId,
    ) -> Result<FriendRequest, Error> {
        if sender_id == receiver_id {
            return Err(invalid_field(&FriendRequestError::SelfRequest));
        }
        self.users
            .find_by_id(receiver_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {receiver_id} not found")))?;

        let forward = self
            .friends
            .find_request(sender_id, receiver_id)
            .await
            .map_err(map_friend_error)?;
        let reverse = self
            .friends
            .find_request(receiver_id, sender_id)
            .await
            .map_err(map_friend_error)?;

        let statuses = [&forward, &reverse].map(|req| req.as_ref().map(FriendRequest::status));
        if statuses.contains(&Some(FriendStatus::Accepted)) {
            return Err(Error::conflict("you are already friends"));
        }
        if statuses[0] == Some(FriendStatus::Pending) {
            return Err(Error::conflict("friend request already pending"));
        }
        if let Some(incoming) = reverse.filter(|req| req.status() == FriendStatus::Pending) {
            return self.accept(incoming).await;
        }
        if let Some(rejected) = forward {
            self.friends
                .delete(rejected.id())
                .await
                .map_err(map_friend_error)?;
        }

        let request = FriendRequest::open(Uuid::new_v4(), *sender_id, *receiver_id, self.clock.utc())
            .map_err(|err| invalid_field(&err))?;
        self.friends
            .insert(&request)
            .await
            .map_err(map_friend_error)?;
        self.events
            .publish(&DomainEvent::FriendRequested {
                request_id: request.id(),
                sender_id: *sender_id,
                receiver_id: *receiver_id,
            })
            .await;
        Ok(request)
    }

    async fn respond(
        &self,
        user_id: &UserId,
        request_id: Uuid,
        accept: bool,
    ) -> Result<FriendRequest, Error> {
        let request = self
            .friends
            .find_by_id(request_id)
            .await
            .map_err(map_friend_error)?
            .ok_or_else(|| Error::not_found(format!("friend request {request_id} not found")))?;
        if request.receiver_id() != user_id {
            return Err(Error::forbidden(
                "only the receiver can respond to a friend request",
            ));
        }
        if accept {
            return self.accept(request).await;
        }

        let rejected = request
            .respond(false, self.clock.utc())
            .map_err(map_transition_error)?;
        self.friends
            .update_status(&rejected)
            .await
            .map_err(map_friend_error)?;
        Ok(rejected)
    }
}

#[async_trait]
impl<F, U> FriendQuery for FriendService<F, U>
where
    F: FriendRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn list_friends(&self, user_id: &UserId) -> Result<Vec<FriendSummary>, Error> {
        self.friends
            .list_friends(user_id)
            .await
            .map_err(map_friend_error)
    }

    async fn list_pending(&self, user_id: &UserId) -> Result<Vec<FriendRequest>, Error> {
        self.friends
            .list_incoming_pending(user_id)
            .await
            .map_err(map_friend_error)
    }
}

#[cfg(test)]
#[path = "friend_service_tests.rs"]
mod tests;
