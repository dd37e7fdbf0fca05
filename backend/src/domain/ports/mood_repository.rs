//! Port for mood journal persistence.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{MoodEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by mood repository adapters.
    pub enum MoodRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "mood repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "mood repository query failed: {message}",
    }
}

/// Result of writing an entry for a (user, date) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodUpsert {
    /// The stored entry. On update it keeps the original id.
    pub entry: MoodEntry,
    /// `true` when no entry existed for the date.
    pub created: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MoodRepository: Send + Sync {
    /// Insert the entry, or overwrite the existing one for the same user and
    /// date.
    async fn upsert(&self, entry: &MoodEntry) -> Result<MoodUpsert, MoodRepositoryError>;

    /// Entries with `from <= mood_date <= to`, newest date first.
    async fn list_range(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodEntry>, MoodRepositoryError>;

    /// The entry for one date, if any.
    async fn find_for_date(
        &self,
        user_id: &UserId,
        mood_date: NaiveDate,
    ) -> Result<Option<MoodEntry>, MoodRepositoryError>;
}
