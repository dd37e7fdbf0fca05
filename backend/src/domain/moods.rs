//! Mood journal entries.
//!
//! A user has at most one entry per calendar date; recording again for the
//! same date replaces the category, intensity and note.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;
use super::validation::FieldViolation;

/// Lowest accepted intensity.
pub const MOOD_INTENSITY_MIN: u8 = 1;
/// Highest accepted intensity.
pub const MOOD_INTENSITY_MAX: u8 = 10;
/// Longest accepted note, in characters.
pub const MOOD_NOTE_MAX: usize = 500;
/// Widest listable date range, in days, both ends included.
pub const MOOD_RANGE_MAX_DAYS: i64 = 366;

/// Validation failures for mood entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoodValidationError {
    #[error("unknown mood category: {0}")]
    UnknownCategory(String),
    #[error("intensity must be between {min} and {max}")]
    IntensityOutOfRange { min: u8, max: u8 },
    #[error("note must be at most {max} characters")]
    NoteTooLong { max: usize },
    #[error("mood date must not be in the future")]
    DateInFuture,
    #[error("`from` must not be after `to`")]
    InvertedRange,
    #[error("date range must span at most {max} days")]
    RangeTooLong { max: i64 },
}

impl FieldViolation for MoodValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::UnknownCategory(_) => "category",
            Self::IntensityOutOfRange { .. } => "intensity",
            Self::NoteTooLong { .. } => "note",
            Self::DateInFuture => "date",
            Self::InvertedRange | Self::RangeTooLong { .. } => "to",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::UnknownCategory(_) => "unknown_value",
            Self::IntensityOutOfRange { .. } => "out_of_range",
            Self::NoteTooLong { .. } => "too_long",
            Self::DateInFuture => "in_future",
            Self::InvertedRange => "before_start",
            Self::RangeTooLong { .. } => "out_of_range",
        }
    }
}

/// Named mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    Calm,
    Happy,
    Excited,
    Grateful,
    Sad,
    Anxious,
    Angry,
    Tired,
}

impl MoodCategory {
    /// Every category.
    pub const ALL: [Self; 8] = [
        Self::Calm,
        Self::Happy,
        Self::Excited,
        Self::Grateful,
        Self::Sad,
        Self::Anxious,
        Self::Angry,
        Self::Tired,
    ];

    /// Stored text form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Happy => "happy",
            Self::Excited => "excited",
            Self::Grateful => "grateful",
            Self::Sad => "sad",
            Self::Anxious => "anxious",
            Self::Angry => "angry",
            Self::Tired => "tired",
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodCategory {
    type Err = MoodValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| MoodValidationError::UnknownCategory(s.to_owned()))
    }
}

/// Unvalidated mood entry parts.
#[derive(Debug, Clone)]
pub struct MoodEntryDraft {
    pub id: Uuid,
    pub user_id: UserId,
    pub mood_date: NaiveDate,
    pub category: MoodCategory,
    pub intensity: u8,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// One mood entry for one user and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    id: Uuid,
    #[schema(value_type = String)]
    user_id: UserId,
    #[schema(value_type = String, format = Date, example = "2026-03-14")]
    mood_date: NaiveDate,
    category: MoodCategory,
    #[schema(minimum = 1, maximum = 10)]
    intensity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl MoodEntry {
    /// Validate a draft.
    ///
    /// Blank notes are stored as absent.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, Utc};
    /// use homecafe::domain::{MoodCategory, MoodEntry, MoodEntryDraft, UserId};
    /// use uuid::Uuid;
    ///
    /// let entry = MoodEntry::new(MoodEntryDraft {
    ///     id: Uuid::new_v4(),
    ///     user_id: UserId::random(),
    ///     mood_date: NaiveDate::from_ymd_opt(2026, 3, 14).expect("date"),
    ///     category: MoodCategory::Calm,
    ///     intensity: 4,
    ///     note: Some("  ".into()),
    ///     recorded_at: Utc::now(),
    /// })
    /// .expect("valid entry");
    /// assert!(entry.note().is_none());
    /// ```
    pub fn new(draft: MoodEntryDraft) -> Result<Self, MoodValidationError> {
        if !(MOOD_INTENSITY_MIN..=MOOD_INTENSITY_MAX).contains(&draft.intensity) {
            return Err(MoodValidationError::IntensityOutOfRange {
                min: MOOD_INTENSITY_MIN,
                max: MOOD_INTENSITY_MAX,
            });
        }
        let note = draft
            .note
            .map(|note| note.trim().to_owned())
            .filter(|note| !note.is_empty());
        if note
            .as_deref()
            .is_some_and(|note| note.chars().count() > MOOD_NOTE_MAX)
        {
            return Err(MoodValidationError::NoteTooLong { max: MOOD_NOTE_MAX });
        }
        Ok(Self {
            id: draft.id,
            user_id: draft.user_id,
            mood_date: draft.mood_date,
            category: draft.category,
            intensity: draft.intensity,
            note,
            recorded_at: draft.recorded_at,
        })
    }

    /// Entry id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owner of the entry.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Day the mood applies to.
    pub fn mood_date(&self) -> NaiveDate {
        self.mood_date
    }

    /// Mood category.
    pub fn category(&self) -> MoodCategory {
        self.category
    }

    /// Intensity between 1 and 10.
    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    /// Optional free-text note.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// When the entry was last written.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Check an inclusive listing range.
pub fn validate_mood_range(from: NaiveDate, to: NaiveDate) -> Result<(), MoodValidationError> {
    if from > to {
        return Err(MoodValidationError::InvertedRange);
    }
    if (to - from).num_days() + 1 > MOOD_RANGE_MAX_DAYS {
        return Err(MoodValidationError::RangeTooLong {
            max: MOOD_RANGE_MAX_DAYS,
        });
    }
    Ok(())
}
