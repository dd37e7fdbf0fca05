//! Achievement definitions, the built-in catalogue, and the evaluator that
//! grants rewards when a user's counters cross a threshold.

mod catalogue;
mod definition;
mod evaluator;

pub use self::catalogue::{
    ACHIEVEMENT_NAMESPACE, achievement_id_for_key, builtin_definitions, install_builtin_catalogue,
};
pub use self::definition::{
    ACHIEVEMENT_KEY_MAX, AchievementCriteria, AchievementDefinition, AchievementDefinitionDraft,
    AchievementKey, AchievementValidationError, EarnedReward, GrantedReward, RewardGrant,
    RewardKind, StatField, UserReward,
};
pub use self::evaluator::AchievementEvaluator;
