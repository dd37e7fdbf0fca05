//! Friend requests and friendships.
//!
//! A friendship is an accepted request; its direction only records who
//! asked. Requests move `pending -> accepted | rejected` and never back.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;
use super::validation::FieldViolation;

/// Invalid friend request construction or transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FriendRequestError {
    #[error("you cannot send a friend request to yourself")]
    SelfRequest,
    #[error("friend request has already been {0}")]
    NotPending(FriendStatus),
    #[error("unknown friend request status: {0}")]
    UnknownStatus(String),
}

impl FieldViolation for FriendRequestError {
    fn field(&self) -> &'static str {
        match self {
            Self::SelfRequest => "receiverId",
            Self::NotPending(_) | Self::UnknownStatus(_) => "status",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::SelfRequest => "self_reference",
            Self::NotPending(_) => "not_pending",
            Self::UnknownStatus(_) => "unknown_value",
        }
    }
}

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendStatus {
    /// Stored text form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendStatus {
    type Err = FriendRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(FriendRequestError::UnknownStatus(other.to_owned())),
        }
    }
}

/// A directed friend request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    id: Uuid,
    #[schema(value_type = String)]
    sender_id: UserId,
    #[schema(value_type = String)]
    receiver_id: UserId,
    status: FriendStatus,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    /// Open a pending request.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use homecafe::domain::{FriendRequest, UserId};
    /// use uuid::Uuid;
    ///
    /// let me = UserId::random();
    /// assert!(FriendRequest::open(Uuid::new_v4(), me, me, Utc::now()).is_err());
    /// ```
    pub fn open(
        id: Uuid,
        sender_id: UserId,
        receiver_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FriendRequestError> {
        if sender_id == receiver_id {
            return Err(FriendRequestError::SelfRequest);
        }
        Ok(Self {
            id,
            sender_id,
            receiver_id,
            status: FriendStatus::Pending,
            created_at,
            responded_at: None,
        })
    }

    /// Rebuild a stored request.
    pub fn restore(
        id: Uuid,
        sender_id: UserId,
        receiver_id: UserId,
        status: FriendStatus,
        created_at: DateTime<Utc>,
        responded_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            sender_id,
            receiver_id,
            status,
            created_at,
            responded_at,
        }
    }

    /// Accept or reject a pending request.
    pub fn respond(
        mut self,
        accept: bool,
        at: DateTime<Utc>,
    ) -> Result<Self, FriendRequestError> {
        if self.status != FriendStatus::Pending {
            return Err(FriendRequestError::NotPending(self.status));
        }
        self.status = if accept {
            FriendStatus::Accepted
        } else {
            FriendStatus::Rejected
        };
        self.responded_at = Some(at);
        Ok(self)
    }

    /// Request id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// User who sent the request.
    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    /// User the request is addressed to.
    pub fn receiver_id(&self) -> &UserId {
        &self.receiver_id
    }

    /// Current status.
    pub fn status(&self) -> FriendStatus {
        self.status
    }

    /// When the request was sent.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the receiver answered, if they have.
    pub fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }
}

/// One of the caller's friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendSummary {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub display_name: String,
    /// When the friendship was accepted.
    pub since: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn pending() -> FriendRequest {
        FriendRequest::open(Uuid::new_v4(), UserId::random(), UserId::random(), Utc::now())
            .expect("distinct users")
    }

    #[rstest]
    #[case(true, FriendStatus::Accepted)]
    #[case(false, FriendStatus::Rejected)]
    fn pending_requests_can_be_answered(#[case] accept: bool, #[case] expected: FriendStatus) {
        let answered = pending().respond(accept, Utc::now()).expect("pending");
        assert_eq!(answered.status(), expected);
        assert!(answered.responded_at().is_some());
    }

    #[rstest]
    fn answered_requests_are_final() {
        let accepted = pending().respond(true, Utc::now()).expect("pending");
        let err = accepted.respond(false, Utc::now()).expect_err("already accepted");
        assert_eq!(err, FriendRequestError::NotPending(FriendStatus::Accepted));
    }
}
