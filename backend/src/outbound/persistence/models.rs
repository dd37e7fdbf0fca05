//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Repositories convert them through the
//! validated domain constructors.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    achievement_definitions, conversations, friend_requests, messages, mood_entries,
    notifications, post_reactions, posts, push_tokens, user_rewards, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
}

// ---------------------------------------------------------------------------
// Posts and reactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub visibility: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_reactions)]
pub(crate) struct NewReactionRow<'a> {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub emoji: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Moods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mood_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MoodEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_date: NaiveDate,
    pub category: String,
    pub intensity: i16,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mood_entries)]
pub(crate) struct NewMoodEntryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_date: NaiveDate,
    pub category: &'a str,
    pub intensity: i16,
    pub note: Option<&'a str>,
    pub recorded_at: DateTime<Utc>,
}

/// Fields overwritten when a mood is recorded again for the same day.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = mood_entries)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MoodEntryUpdate<'a> {
    pub category: &'a str,
    pub intensity: i16,
    pub note: Option<&'a str>,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Friends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = friend_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FriendRequestRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConversationRow {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications and push tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = push_tokens)]
pub(crate) struct NewPushTokenRow<'a> {
    pub token: &'a str,
    pub user_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = achievement_definitions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AchievementDefinitionRow {
    pub id: Uuid,
    pub key: String,
    pub reward_kind: String,
    pub name: String,
    pub description: String,
    pub criteria: serde_json::Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = achievement_definitions)]
pub(crate) struct NewAchievementDefinitionRow<'a> {
    pub id: Uuid,
    pub key: &'a str,
    pub reward_kind: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub criteria: serde_json::Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_rewards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRewardRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub granted_at: DateTime<Utc>,
}
