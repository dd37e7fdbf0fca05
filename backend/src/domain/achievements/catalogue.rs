//! Built-in achievement catalogue.
//!
//! Definitions are identified by key. Ids are derived from the key with a
//! UUIDv5 so every deployment agrees on them without a lookup.

use tracing::info;
use uuid::Uuid;

use super::definition::{
    AchievementCriteria, AchievementDefinition, AchievementDefinitionDraft,
    AchievementValidationError, RewardKind, StatField,
};
use crate::domain::ports::{AchievementRepository, AchievementRepositoryError};
use crate::domain::{Error, EventType};

/// Namespace for achievement id derivation.
pub const ACHIEVEMENT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a9e_4d7b_4e0a_9c35_b1d8_e2f4_a601);

/// Derive the stable id for an achievement key.
///
/// # Examples
/// ```
/// use homecafe::domain::achievement_id_for_key;
///
/// assert_eq!(achievement_id_for_key("first_post"), achievement_id_for_key("first_post"));
/// assert_ne!(achievement_id_for_key("first_post"), achievement_id_for_key("first_mood"));
/// ```
pub fn achievement_id_for_key(key: &str) -> Uuid {
    Uuid::new_v5(&ACHIEVEMENT_NAMESPACE, key.as_bytes())
}

struct Entry {
    key: &'static str,
    reward_kind: RewardKind,
    name: &'static str,
    description: &'static str,
    event_type: EventType,
    threshold: u32,
    field: StatField,
}

const CATALOGUE: [Entry; 11] = [
    Entry {
        key: "first_post",
        reward_kind: RewardKind::Badge,
        name: "First Brew",
        description: "Share your first post.",
        event_type: EventType::PostCreated,
        threshold: 1,
        field: StatField::PostCount,
    },
    Entry {
        key: "ten_posts",
        reward_kind: RewardKind::Badge,
        name: "Regular Storyteller",
        description: "Share ten posts.",
        event_type: EventType::PostCreated,
        threshold: 10,
        field: StatField::PostCount,
    },
    Entry {
        key: "first_mood",
        reward_kind: RewardKind::Sticker,
        name: "Checking In",
        description: "Record your first mood.",
        event_type: EventType::MoodRecorded,
        threshold: 1,
        field: StatField::MoodCount,
    },
    Entry {
        key: "mood_regular",
        reward_kind: RewardKind::Badge,
        name: "Mood Regular",
        description: "Record seven moods.",
        event_type: EventType::MoodRecorded,
        threshold: 7,
        field: StatField::MoodCount,
    },
    Entry {
        key: "mood_devotee",
        reward_kind: RewardKind::Badge,
        name: "Mood Devotee",
        description: "Record thirty moods.",
        event_type: EventType::MoodRecorded,
        threshold: 30,
        field: StatField::MoodCount,
    },
    Entry {
        key: "first_friend",
        reward_kind: RewardKind::Sticker,
        name: "Table for Two",
        description: "Make your first friend.",
        event_type: EventType::FriendAccepted,
        threshold: 1,
        field: StatField::FriendCount,
    },
    Entry {
        key: "social_butterfly",
        reward_kind: RewardKind::Badge,
        name: "Social Butterfly",
        description: "Make ten friends.",
        event_type: EventType::FriendAccepted,
        threshold: 10,
        field: StatField::FriendCount,
    },
    Entry {
        key: "first_reaction",
        reward_kind: RewardKind::Sticker,
        name: "Warm Welcome",
        description: "React to a post for the first time.",
        event_type: EventType::ReactionAdded,
        threshold: 1,
        field: StatField::ReactionsGiven,
    },
    Entry {
        key: "crowd_favourite",
        reward_kind: RewardKind::Badge,
        name: "Crowd Favourite",
        description: "Receive twenty-five reactions on your posts.",
        event_type: EventType::ReactionAdded,
        threshold: 25,
        field: StatField::ReactionsReceived,
    },
    Entry {
        key: "first_message",
        reward_kind: RewardKind::Sticker,
        name: "Hello There",
        description: "Send your first message.",
        event_type: EventType::MessageSent,
        threshold: 1,
        field: StatField::MessagesSent,
    },
    Entry {
        key: "chatterbox",
        reward_kind: RewardKind::Badge,
        name: "Chatterbox",
        description: "Send one hundred messages.",
        event_type: EventType::MessageSent,
        threshold: 100,
        field: StatField::MessagesSent,
    },
];

/// The definitions shipped with the server.
///
/// # Errors
/// Only fails if the static table itself is invalid, which the unit tests
/// rule out.
pub fn builtin_definitions() -> Result<Vec<AchievementDefinition>, AchievementValidationError> {
    CATALOGUE
        .iter()
        .map(|entry| {
            let criteria =
                AchievementCriteria::new(entry.event_type, entry.threshold, entry.field)?;
            AchievementDefinition::new(AchievementDefinitionDraft {
                id: achievement_id_for_key(entry.key),
                key: entry.key.to_owned(),
                reward_kind: entry.reward_kind,
                name: entry.name.to_owned(),
                description: entry.description.to_owned(),
                criteria,
            })
        })
        .collect()
}

/// Upsert the built-in catalogue so the definitions table always contains it.
///
/// Returns the number of definitions written.
pub async fn install_builtin_catalogue<R>(repository: &R) -> Result<usize, Error>
where
    R: AchievementRepository + ?Sized,
{
    let definitions = builtin_definitions()
        .map_err(|err| Error::internal(format!("built-in achievement catalogue invalid: {err}")))?;
    repository
        .upsert_definitions(&definitions)
        .await
        .map_err(|err| match err {
            AchievementRepositoryError::Connection { message } => Error::service_unavailable(
                format!("achievement repository unavailable: {message}"),
            ),
            other => Error::internal(format!("failed to install achievements: {other}")),
        })?;
    info!(count = definitions.len(), "achievement catalogue installed");
    Ok(definitions.len())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::ports::MockAchievementRepository;
    use rstest::rstest;

    #[rstest]
    fn catalogue_is_valid_and_unique() {
        let definitions = builtin_definitions().expect("catalogue validates");
        assert_eq!(definitions.len(), CATALOGUE.len());

        let keys: HashSet<_> = definitions.iter().map(|d| d.key().as_str()).collect();
        let ids: HashSet<_> = definitions.iter().map(AchievementDefinition::id).collect();
        assert_eq!(keys.len(), definitions.len());
        assert_eq!(ids.len(), definitions.len());
    }

    #[rstest]
    fn every_evaluated_event_type_has_a_definition() {
        let definitions = builtin_definitions().expect("catalogue validates");
        for event_type in [
            EventType::PostCreated,
            EventType::MoodRecorded,
            EventType::ReactionAdded,
            EventType::FriendAccepted,
            EventType::MessageSent,
        ] {
            assert!(
                definitions
                    .iter()
                    .any(|d| d.criteria().event_type() == event_type),
                "no definition for {event_type}"
            );
        }
    }

    #[rstest]
    #[tokio::test]
    async fn install_upserts_every_definition() {
        let mut repo = MockAchievementRepository::new();
        repo.expect_upsert_definitions()
            .withf(|defs| defs.len() == CATALOGUE.len())
            .times(1)
            .returning(|_| Ok(()));

        let written = install_builtin_catalogue(&repo).await.expect("install");
        assert_eq!(written, CATALOGUE.len());
    }

    #[rstest]
    #[tokio::test]
    async fn install_maps_connection_failures() {
        let mut repo = MockAchievementRepository::new();
        repo.expect_upsert_definitions()
            .returning(|_| Err(AchievementRepositoryError::connection("refused")));

        let err = install_builtin_catalogue(&repo)
            .await
            .expect_err("connection failure");
        assert_eq!(err.code(), crate::domain::ErrorCode::ServiceUnavailable);
    }
}
