//! Driving port for achievement evaluation.

use async_trait::async_trait;

use crate::domain::{Error, EventType, GrantedReward, UserId};

/// Decide which achievements `user_id` has newly earned after an event of
/// `event_type`, and record them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvaluateAchievements: Send + Sync {
    /// Returns the rewards granted by this call; empty when nothing new was
    /// earned. Calling it again with the same inputs grants nothing.
    async fn evaluate(
        &self,
        user_id: &UserId,
        event_type: EventType,
    ) -> Result<Vec<GrantedReward>, Error>;
}
