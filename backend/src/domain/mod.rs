//! Domain primitives, aggregates, and the services that drive them.
//!
//! Purpose: define strongly typed domain entities used by the HTTP and
//! persistence adapters, plus the use-case services that sit behind the
//! driving ports in [`ports`]. Types validate on construction so adapters
//! never observe an invalid aggregate.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - [`DomainEvent`]: facts published after persistence succeeds.
//! - Aggregates: moods, posts, friendships, chat, notifications and
//!   achievements.
//! - Services implementing the driving ports.

pub mod achievements;
pub mod auth;
mod chat;
mod chat_service;
mod dispatcher;
pub mod error;
mod events;
#[cfg(test)]
pub(crate) mod fixture_clock;
mod friend_service;
mod friends;
mod gamification;
mod mood_service;
mod moods;
mod notification_handler;
mod notification_service;
mod notifications;
mod notifier;
pub mod ports;
mod post_service;
mod posts;
mod push;
mod push_token_service;
mod reward_service;
mod trace_id;
pub mod user;
mod user_profile_service;
pub(crate) mod validation;

pub use self::achievements::{
    ACHIEVEMENT_KEY_MAX, ACHIEVEMENT_NAMESPACE, AchievementCriteria, AchievementDefinition,
    AchievementDefinitionDraft, AchievementEvaluator, AchievementKey, AchievementValidationError,
    EarnedReward, GrantedReward, RewardGrant, RewardKind, StatField, UserReward,
    achievement_id_for_key, builtin_definitions, install_builtin_catalogue,
};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::chat::{
    ChatValidationError, Conversation, ConversationSummary, MESSAGE_CONTENT_MAX,
    MESSAGE_PREVIEW_CHARS, Message, MessageKey, ordered_pair,
};
pub use self::chat_service::ChatService;
pub use self::dispatcher::InProcessEventDispatcher;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::events::{DomainEvent, EventType, UnknownEventType};
pub use self::friend_service::FriendService;
pub use self::friends::{FriendRequest, FriendRequestError, FriendStatus, FriendSummary};
pub use self::gamification::GamificationHandler;
pub use self::mood_service::MoodService;
pub use self::moods::{
    MOOD_INTENSITY_MAX, MOOD_INTENSITY_MIN, MOOD_NOTE_MAX, MOOD_RANGE_MAX_DAYS, MoodCategory,
    MoodEntry, MoodEntryDraft, MoodValidationError, validate_mood_range,
};
pub use self::notification_handler::SocialNotificationHandler;
pub use self::notification_service::NotificationService;
pub use self::notifications::{
    NOTIFICATION_LIST_LIMIT, Notification, NotificationDraft, NotificationKind,
    UnknownNotificationKind,
};
pub use self::notifier::NotificationDispatchService;
pub use self::post_service::PostService;
pub use self::posts::{
    EMOJI_MAX_BYTES, Emoji, FeedKey, POST_CONTENT_MAX, POST_IMAGES_MAX, Post, PostDetail,
    PostDraft, PostValidationError, ReactionCount, ReactionToggle, Visibility,
};
pub use self::push::{
    PushMessage, PushOutcome, PushReceipt, PushToken, PushTokenValidationError,
};
pub use self::push_token_service::PushTokenService;
pub use self::reward_service::RewardService;
pub use self::trace_id::TraceId;
pub use self::user::{DisplayName, User, UserId, UserValidationError};
pub use self::user_profile_service::UserProfileService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use homecafe::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
