//! Port answering the per-user counters achievements are measured against.

use async_trait::async_trait;

use crate::domain::{StatField, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by activity statistics adapters.
    pub enum ActivityStatsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "activity stats connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "activity stats query failed: {message}",
    }
}

/// One count query per [`StatField`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityStatsRepository: Send + Sync {
    /// Current value of `field` for `user_id`.
    async fn count(
        &self,
        user_id: &UserId,
        field: StatField,
    ) -> Result<u64, ActivityStatsRepositoryError>;
}
