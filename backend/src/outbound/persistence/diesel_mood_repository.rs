//! PostgreSQL-backed `MoodRepository` implementation using Diesel ORM.
//!
//! Recording a mood is a single `INSERT .. ON CONFLICT (user_id, mood_date)
//! DO UPDATE`. The conflict branch keeps the stored id, so comparing the
//! returned id with the submitted one tells an insert from an update.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MoodRepository, MoodRepositoryError, MoodUpsert};
use crate::domain::{MoodCategory, MoodEntry, MoodEntryDraft, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MoodEntryRow, MoodEntryUpdate, NewMoodEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::mood_entries;

/// Diesel-backed implementation of the mood repository port.
#[derive(Clone)]
pub struct DieselMoodRepository {
    pool: DbPool,
}

impl DieselMoodRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MoodRepositoryError {
    map_basic_pool_error(error, MoodRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MoodRepositoryError {
    map_basic_diesel_error(
        error,
        MoodRepositoryError::query,
        MoodRepositoryError::connection,
    )
}

fn row_to_entry(row: MoodEntryRow) -> Result<MoodEntry, MoodRepositoryError> {
    let category: MoodCategory = row
        .category
        .parse()
        .map_err(|err| MoodRepositoryError::query(format!("stored mood: {err}")))?;
    let intensity = u8::try_from(row.intensity)
        .map_err(|_| MoodRepositoryError::query("stored mood intensity out of range"))?;

    MoodEntry::new(MoodEntryDraft {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        mood_date: row.mood_date,
        category,
        intensity,
        note: row.note,
        recorded_at: row.recorded_at,
    })
    .map_err(|err| MoodRepositoryError::query(format!("stored mood: {err}")))
}

#[async_trait]
impl MoodRepository for DieselMoodRepository {
    async fn upsert(&self, entry: &MoodEntry) -> Result<MoodUpsert, MoodRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let intensity = i16::from(entry.intensity());
        let row = NewMoodEntryRow {
            id: entry.id(),
            user_id: *entry.user_id().as_uuid(),
            mood_date: entry.mood_date(),
            category: entry.category().as_str(),
            intensity,
            note: entry.note(),
            recorded_at: entry.recorded_at(),
        };
        let update = MoodEntryUpdate {
            category: entry.category().as_str(),
            intensity,
            note: entry.note(),
            recorded_at: entry.recorded_at(),
        };

        let stored = diesel::insert_into(mood_entries::table)
            .values(&row)
            .on_conflict((mood_entries::user_id, mood_entries::mood_date))
            .do_update()
            .set(&update)
            .returning(MoodEntryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let created = stored.id == entry.id();
        Ok(MoodUpsert {
            entry: row_to_entry(stored)?,
            created,
        })
    }

    async fn list_range(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodEntry>, MoodRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MoodEntryRow> = mood_entries::table
            .filter(mood_entries::user_id.eq(user_id.as_uuid()))
            .filter(mood_entries::mood_date.between(from, to))
            .order(mood_entries::mood_date.desc())
            .select(MoodEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn find_for_date(
        &self,
        user_id: &UserId,
        mood_date: NaiveDate,
    ) -> Result<Option<MoodEntry>, MoodRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = mood_entries::table
            .filter(mood_entries::user_id.eq(user_id.as_uuid()))
            .filter(mood_entries::mood_date.eq(mood_date))
            .select(MoodEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_entry).transpose()
    }
}
