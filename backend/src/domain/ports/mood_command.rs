//! Driving ports for the mood journal.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, MoodCategory, MoodEntry, UserId};

/// Request to record today's (or a given day's) mood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMoodRequest {
    pub user_id: UserId,
    /// Defaults to the current date.
    pub mood_date: Option<NaiveDate>,
    pub category: MoodCategory,
    pub intensity: u8,
    pub note: Option<String>,
}

/// Response from recording a mood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMoodResponse {
    pub entry: MoodEntry,
    /// `false` when an existing entry for the date was overwritten.
    pub created: bool,
}

/// Mood write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MoodCommand: Send + Sync {
    /// Create or replace the caller's entry for the date.
    ///
    /// Only a newly created entry announces `mood.recorded`.
    async fn record_mood(&self, request: RecordMoodRequest) -> Result<RecordMoodResponse, Error>;
}

/// Mood read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MoodQuery: Send + Sync {
    /// Entries in an inclusive date range of at most 366 days, newest first.
    async fn list_moods(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodEntry>, Error>;

    /// The caller's entry for `mood_date`; not found when absent.
    async fn mood_for_date(&self, user_id: &UserId, mood_date: NaiveDate)
    -> Result<MoodEntry, Error>;
}
