//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`],
//! [`EvaluateAchievements`]) are called by inbound adapters and event
//! handlers. Driven ports (`*Repository`, [`PushSender`], [`UserNotifier`],
//! [`EventPublisher`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod achievement_repository;
mod activity_stats_repository;
mod chat_command;
mod chat_repository;
mod evaluate_achievements;
mod event_handler;
mod event_publisher;
mod friend_command;
mod friend_repository;
mod login_service;
mod mood_command;
mod mood_repository;
mod notification_command;
mod notification_repository;
mod post_command;
mod post_repository;
mod push_sender;
mod push_token_command;
mod push_token_repository;
mod rewards_query;
mod user_notifier;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use achievement_repository::MockAchievementRepository;
pub use achievement_repository::{AchievementRepository, AchievementRepositoryError};
#[cfg(test)]
pub use activity_stats_repository::MockActivityStatsRepository;
pub use activity_stats_repository::{ActivityStatsRepository, ActivityStatsRepositoryError};
#[cfg(test)]
pub use chat_command::{MockChatCommand, MockChatQuery};
pub use chat_command::{ChatCommand, ChatQuery, ListMessagesRequest, MessagePage};
#[cfg(test)]
pub use chat_repository::MockChatRepository;
pub use chat_repository::{ChatRepository, ChatRepositoryError};
pub use evaluate_achievements::EvaluateAchievements;
#[cfg(test)]
pub use evaluate_achievements::MockEvaluateAchievements;
pub use event_handler::EventHandler;
#[cfg(test)]
pub use event_handler::MockEventHandler;
#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use event_publisher::{EventPublisher, NoOpEventPublisher};
pub use friend_command::{FriendCommand, FriendQuery};
#[cfg(test)]
pub use friend_command::{MockFriendCommand, MockFriendQuery};
#[cfg(test)]
pub use friend_repository::MockFriendRepository;
pub use friend_repository::{FriendRepository, FriendRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{
    FIXTURE_ACCOUNTS, FIXTURE_PASSWORD, FixtureAccount, FixtureLoginService, LoginService,
    fixture_users,
};
#[cfg(test)]
pub use mood_command::{MockMoodCommand, MockMoodQuery};
pub use mood_command::{MoodCommand, MoodQuery, RecordMoodRequest, RecordMoodResponse};
#[cfg(test)]
pub use mood_repository::MockMoodRepository;
pub use mood_repository::{MoodRepository, MoodRepositoryError, MoodUpsert};
#[cfg(test)]
pub use notification_command::{MockNotificationCommand, MockNotificationQuery};
pub use notification_command::{NotificationCommand, NotificationQuery};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use post_command::{MockPostCommand, MockPostQuery};
pub use post_command::{CreatePostRequest, FeedPage, FeedRequest, PostCommand, PostQuery};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
#[cfg(test)]
pub use push_sender::MockPushSender;
pub use push_sender::{NoOpPushSender, PushSendError, PushSender};
#[cfg(test)]
pub use push_token_command::MockPushTokenCommand;
pub use push_token_command::PushTokenCommand;
#[cfg(test)]
pub use push_token_repository::MockPushTokenRepository;
pub use push_token_repository::{PushTokenRepository, PushTokenRepositoryError};
#[cfg(test)]
pub use rewards_query::MockRewardsQuery;
pub use rewards_query::{AchievementStatus, RewardSummary, RewardsQuery};
#[cfg(test)]
pub use user_notifier::MockUserNotifier;
pub use user_notifier::UserNotifier;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
