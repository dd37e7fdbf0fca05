//! Achievement definitions and earned rewards.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::validation::FieldViolation;
use crate::domain::{EventType, UserId};

/// Longest accepted achievement key.
pub const ACHIEVEMENT_KEY_MAX: usize = 64;

/// Validation failures for achievement definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AchievementValidationError {
    #[error("achievement key must be lowercase snake case and at most {max} characters")]
    InvalidKey { max: usize },
    #[error("achievement name must not be empty")]
    EmptyName,
    #[error("achievement threshold must be at least 1")]
    ZeroThreshold,
    #[error("unknown reward kind: {0}")]
    UnknownRewardKind(String),
    #[error("unknown statistic field: {0}")]
    UnknownField(String),
}

impl FieldViolation for AchievementValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::InvalidKey { .. } => "key",
            Self::EmptyName => "name",
            Self::ZeroThreshold => "threshold",
            Self::UnknownRewardKind(_) => "rewardKind",
            Self::UnknownField(_) => "field",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::InvalidKey { .. } => "invalid_key",
            Self::EmptyName => "empty",
            Self::ZeroThreshold => "out_of_range",
            Self::UnknownRewardKind(_) | Self::UnknownField(_) => "unknown_value",
        }
    }
}

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_regex() -> &'static Regex {
    KEY_RE.get_or_init(|| {
        Regex::new("^[a-z][a-z0-9]*(_[a-z0-9]+)*$")
            .unwrap_or_else(|error| panic!("achievement key regex failed to compile: {error}"))
    })
}

/// Stable, human-readable achievement key such as `first_post`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AchievementKey(String);

impl AchievementKey {
    /// Validate a key.
    ///
    /// # Examples
    /// ```
    /// use homecafe::domain::AchievementKey;
    ///
    /// assert!(AchievementKey::new("mood_regular").is_ok());
    /// assert!(AchievementKey::new("MoodRegular").is_err());
    /// assert!(AchievementKey::new("mood__regular").is_err());
    /// ```
    pub fn new(key: impl Into<String>) -> Result<Self, AchievementValidationError> {
        let key = key.into();
        if key.len() > ACHIEVEMENT_KEY_MAX || !key_regex().is_match(&key) {
            return Err(AchievementValidationError::InvalidKey {
                max: ACHIEVEMENT_KEY_MAX,
            });
        }
        Ok(Self(key))
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AchievementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AchievementKey> for String {
    fn from(value: AchievementKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for AchievementKey {
    type Error = AchievementValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// What the user receives when an achievement is earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// A profile badge.
    Badge,
    /// A sticker usable in posts and chat.
    Sticker,
}

impl RewardKind {
    /// Stored text form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Badge => "badge",
            Self::Sticker => "sticker",
        }
    }
}

impl FromStr for RewardKind {
    type Err = AchievementValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "badge" => Ok(Self::Badge),
            "sticker" => Ok(Self::Sticker),
            other => Err(AchievementValidationError::UnknownRewardKind(other.to_owned())),
        }
    }
}

/// Per-user statistic an achievement threshold is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    /// Posts authored by the user.
    PostCount,
    /// Mood entries recorded by the user.
    MoodCount,
    /// Accepted friendships involving the user.
    FriendCount,
    /// Reactions the user placed.
    ReactionsGiven,
    /// Reactions placed on the user's posts.
    ReactionsReceived,
    /// Messages the user sent.
    MessagesSent,
}

impl StatField {
    /// Wire name stored inside achievement criteria.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostCount => "post_count",
            Self::MoodCount => "mood_count",
            Self::FriendCount => "friend_count",
            Self::ReactionsGiven => "reactions_given",
            Self::ReactionsReceived => "reactions_received",
            Self::MessagesSent => "messages_sent",
        }
    }
}

impl FromStr for StatField {
    type Err = AchievementValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::PostCount,
            Self::MoodCount,
            Self::FriendCount,
            Self::ReactionsGiven,
            Self::ReactionsReceived,
            Self::MessagesSent,
        ]
        .into_iter()
        .find(|field| field.as_str() == s)
        .ok_or_else(|| AchievementValidationError::UnknownField(s.to_owned()))
    }
}

/// Rule deciding when an achievement is earned.
///
/// Persisted as JSON: `{"eventType":"post.created","threshold":10,"field":"post_count"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCriteria")]
pub struct AchievementCriteria {
    event_type: EventType,
    threshold: u32,
    field: StatField,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCriteria {
    event_type: EventType,
    threshold: u32,
    field: StatField,
}

impl TryFrom<RawCriteria> for AchievementCriteria {
    type Error = AchievementValidationError;

    fn try_from(value: RawCriteria) -> Result<Self, Self::Error> {
        Self::new(value.event_type, value.threshold, value.field)
    }
}

impl AchievementCriteria {
    /// Validate and construct criteria.
    pub fn new(
        event_type: EventType,
        threshold: u32,
        field: StatField,
    ) -> Result<Self, AchievementValidationError> {
        if threshold == 0 {
            return Err(AchievementValidationError::ZeroThreshold);
        }
        Ok(Self {
            event_type,
            threshold,
            field,
        })
    }

    /// Event type that triggers evaluation.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Minimum statistic value required.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Statistic compared against the threshold.
    pub fn field(&self) -> StatField {
        self.field
    }

    /// Whether `value` meets the threshold.
    pub fn is_met_by(&self, value: u64) -> bool {
        value >= u64::from(self.threshold)
    }
}

/// Unvalidated definition parts.
#[derive(Debug, Clone)]
pub struct AchievementDefinitionDraft {
    pub id: Uuid,
    pub key: String,
    pub reward_kind: RewardKind,
    pub name: String,
    pub description: String,
    pub criteria: AchievementCriteria,
}

/// A rule plus the reward it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDefinition {
    id: Uuid,
    key: AchievementKey,
    reward_kind: RewardKind,
    name: String,
    description: String,
    criteria: AchievementCriteria,
}

impl AchievementDefinition {
    /// Validate a draft.
    pub fn new(draft: AchievementDefinitionDraft) -> Result<Self, AchievementValidationError> {
        let AchievementDefinitionDraft {
            id,
            key,
            reward_kind,
            name,
            description,
            criteria,
        } = draft;
        let key = AchievementKey::new(key)?;
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(AchievementValidationError::EmptyName);
        }
        Ok(Self {
            id,
            key,
            reward_kind,
            name,
            description: description.trim().to_owned(),
            criteria,
        })
    }

    /// Stable id derived from the key.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Unique catalogue key.
    pub fn key(&self) -> &AchievementKey {
        &self.key
    }

    /// Kind of reward granted.
    pub fn reward_kind(&self) -> RewardKind {
        self.reward_kind
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Rule that earns the reward.
    pub fn criteria(&self) -> &AchievementCriteria {
        &self.criteria
    }
}

/// A reward row: the user earned the achievement at `granted_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReward {
    pub id: Uuid,
    pub user_id: UserId,
    pub achievement_id: Uuid,
    pub granted_at: DateTime<Utc>,
}

/// Result of attempting to record a reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardGrant {
    /// A new reward row was written.
    Granted(UserReward),
    /// A reward for this pair already existed; nothing was written.
    AlreadyGranted,
}

/// Summary of a reward granted during one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantedReward {
    pub achievement_id: Uuid,
    pub key: AchievementKey,
    pub reward_kind: RewardKind,
    pub name: String,
    pub granted_at: DateTime<Utc>,
}

/// A reward joined with its definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarnedReward {
    pub reward: UserReward,
    pub definition: AchievementDefinition,
}
