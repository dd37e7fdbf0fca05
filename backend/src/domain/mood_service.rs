//! Mood journal service.
//!
//! Implements [`MoodCommand`] and [`MoodQuery`] over a [`MoodRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    EventPublisher, MoodCommand, MoodQuery, MoodRepository, MoodRepositoryError,
    RecordMoodRequest, RecordMoodResponse,
};
use crate::domain::validation::invalid_field;
use crate::domain::{
    DomainEvent, Error, MoodEntry, MoodEntryDraft, MoodValidationError, UserId,
    validate_mood_range,
};

fn map_repository_error(error: MoodRepositoryError) -> Error {
    match error {
        MoodRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("mood repository unavailable: {message}"))
        }
        MoodRepositoryError::Query { message } => {
            Error::internal(format!("mood repository error: {message}"))
        }
    }
}

/// Mood service implementing the mood driving ports.
#[derive(Clone)]
pub struct MoodService<R: ?Sized> {
    mood_repo: Arc<R>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> MoodService<R> {
    /// Create a mood service over `mood_repo`.
    pub fn new(mood_repo: Arc<R>, events: Arc<dyn EventPublisher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            mood_repo,
            events,
            clock,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }
}

#[async_trait]
impl<R> MoodCommand for MoodService<R>
where
    R: MoodRepository + ?Sized,
{
    async fn record_mood(&self, request: RecordMoodRequest) -> Result<RecordMoodResponse, Error> {
        let today = self.today();
        let mood_date = request.mood_date.unwrap_or(today);
        // One day of slack for clients ahead of UTC.
        if today
            .checked_add_days(Days::new(1))
            .is_some_and(|latest| mood_date > latest)
        {
            return Err(invalid_field(&MoodValidationError::DateInFuture));
        }

        let entry = MoodEntry::new(MoodEntryDraft {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            mood_date,
            category: request.category,
            intensity: request.intensity,
            note: request.note,
            recorded_at: self.clock.utc(),
        })
        .map_err(|err| invalid_field(&err))?;

        let outcome = self
            .mood_repo
            .upsert(&entry)
            .await
            .map_err(map_repository_error)?;

        if outcome.created {
            self.events
                .publish(&DomainEvent::MoodRecorded {
                    entry_id: outcome.entry.id(),
                    user_id: *outcome.entry.user_id(),
                    mood_date: outcome.entry.mood_date(),
                })
                .await;
        }

        Ok(RecordMoodResponse {
            entry: outcome.entry,
            created: outcome.created,
        })
    }
}

#[async_trait]
impl<R> MoodQuery for MoodService<R>
where
    R: MoodRepository + ?Sized,
{
    async fn list_moods(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodEntry>, Error> {
        validate_mood_range(from, to).map_err(|err| invalid_field(&err))?;
        self.mood_repo
            .list_range(user_id, from, to)
            .await
            .map_err(map_repository_error)
    }

    async fn mood_for_date(
        &self,
        user_id: &UserId,
        mood_date: NaiveDate,
    ) -> Result<MoodEntry, Error> {
        self.mood_repo
            .find_for_date(user_id, mood_date)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("no mood recorded for {mood_date}")))
    }
}

#[cfg(test)]
#[path = "mood_service_tests.rs"]
mod tests;
