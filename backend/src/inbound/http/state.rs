//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ChatCommand, ChatQuery, FriendCommand, FriendQuery, LoginService, MoodCommand, MoodQuery,
    NotificationCommand, NotificationQuery, PostCommand, PostQuery, PushTokenCommand,
    RewardsQuery, UserProfileQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub moods: Arc<dyn MoodCommand>,
    pub moods_query: Arc<dyn MoodQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub posts_query: Arc<dyn PostQuery>,
    pub friends: Arc<dyn FriendCommand>,
    pub friends_query: Arc<dyn FriendQuery>,
    pub chat: Arc<dyn ChatCommand>,
    pub chat_query: Arc<dyn ChatQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
    pub push_tokens: Arc<dyn PushTokenCommand>,
    pub rewards: Arc<dyn RewardsQuery>,
}

#[cfg(test)]
pub(crate) mod test_state {
    //! Builders for handler tests: every port defaults to an expectation-free
    //! mock so a test only configures the port it exercises.

    use super::*;
    use crate::domain::ports::{
        MockChatCommand, MockChatQuery, MockFriendCommand, MockFriendQuery, MockLoginService,
        MockMoodCommand, MockMoodQuery, MockNotificationCommand, MockNotificationQuery,
        MockPostCommand, MockPostQuery, MockPushTokenCommand, MockRewardsQuery,
        MockUserProfileQuery,
    };

    pub(crate) struct MockPorts {
        pub login: MockLoginService,
        pub profile: MockUserProfileQuery,
        pub moods: MockMoodCommand,
        pub moods_query: MockMoodQuery,
        pub posts: MockPostCommand,
        pub posts_query: MockPostQuery,
        pub friends: MockFriendCommand,
        pub friends_query: MockFriendQuery,
        pub chat: MockChatCommand,
        pub chat_query: MockChatQuery,
        pub notifications: MockNotificationCommand,
        pub notifications_query: MockNotificationQuery,
        pub push_tokens: MockPushTokenCommand,
        pub rewards: MockRewardsQuery,
    }

    impl Default for MockPorts {
        fn default() -> Self {
            Self {
                login: MockLoginService::new(),
                profile: MockUserProfileQuery::new(),
                moods: MockMoodCommand::new(),
                moods_query: MockMoodQuery::new(),
                posts: MockPostCommand::new(),
                posts_query: MockPostQuery::new(),
                friends: MockFriendCommand::new(),
                friends_query: MockFriendQuery::new(),
                chat: MockChatCommand::new(),
                chat_query: MockChatQuery::new(),
                notifications: MockNotificationCommand::new(),
                notifications_query: MockNotificationQuery::new(),
                push_tokens: MockPushTokenCommand::new(),
                rewards: MockRewardsQuery::new(),
            }
        }
    }

    impl From<MockPorts> for HttpState {
        fn from(ports: MockPorts) -> Self {
            Self {
                login: Arc::new(ports.login),
                profile: Arc::new(ports.profile),
                moods: Arc::new(ports.moods),
                moods_query: Arc::new(ports.moods_query),
                posts: Arc::new(ports.posts),
                posts_query: Arc::new(ports.posts_query),
                friends: Arc::new(ports.friends),
                friends_query: Arc::new(ports.friends_query),
                chat: Arc::new(ports.chat),
                chat_query: Arc::new(ports.chat_query),
                notifications: Arc::new(ports.notifications),
                notifications_query: Arc::new(ports.notifications_query),
                push_tokens: Arc::new(ports.push_tokens),
                rewards: Arc::new(ports.rewards),
            }
        }
    }
}
