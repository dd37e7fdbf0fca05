//! Builders wiring repositories, the event pipeline and services into
//! [`HttpState`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::domain::ports::{
    AchievementRepository, ActivityStatsRepository, ChatRepository, EventHandler,
    FixtureLoginService, FriendRepository, MoodRepository, NotificationRepository,
    PostRepository, PushSender, PushTokenRepository, UserNotifier, UserRepository, fixture_users,
};
use crate::domain::{
    AchievementEvaluator, ChatService, Error, FriendService, GamificationHandler,
    InProcessEventDispatcher, MoodService, NotificationDispatchService, NotificationService,
    PostService, PushTokenService, RewardService, SocialNotificationHandler, UserProfileService,
    install_builtin_catalogue,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselAchievementRepository, DieselActivityStatsRepository, DieselChatRepository,
    DieselFriendRepository, DieselMoodRepository, DieselNotificationRepository,
    DieselPostRepository, DieselPushTokenRepository, DieselUserRepository,
};

/// Driven adapters behind every use-case.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub moods: Arc<dyn MoodRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub friends: Arc<dyn FriendRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub push_tokens: Arc<dyn PushTokenRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub stats: Arc<dyn ActivityStatsRepository>,
}

impl Repositories {
    /// Every port served by one shared in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            moods: store.clone(),
            posts: store.clone(),
            friends: store.clone(),
            chats: store.clone(),
            notifications: store.clone(),
            push_tokens: store.clone(),
            achievements: store.clone(),
            stats: store,
        }
    }

    /// Diesel repositories sharing `pool`.
    pub fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            moods: Arc::new(DieselMoodRepository::new(pool.clone())),
            posts: Arc::new(DieselPostRepository::new(pool.clone())),
            friends: Arc::new(DieselFriendRepository::new(pool.clone())),
            chats: Arc::new(DieselChatRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
            push_tokens: Arc::new(DieselPushTokenRepository::new(pool.clone())),
            achievements: Arc::new(DieselAchievementRepository::new(pool.clone())),
            stats: Arc::new(DieselActivityStatsRepository::new(pool.clone())),
        }
    }
}

/// Write the data every deployment expects before serving: the demo
/// accounts and the built-in achievement catalogue.
///
/// # Errors
/// Returns [`Error::service_unavailable`] when a repository cannot be
/// reached and [`Error::internal`] when the built-in data is invalid.
pub async fn seed_reference_data(repos: &Repositories) -> Result<(), Error> {
    let users = fixture_users()?;
    for user in &users {
        repos.users.upsert(user).await.map_err(|err| {
            Error::service_unavailable(format!("failed to seed user {}: {err}", user.id()))
        })?;
    }
    let definitions = install_builtin_catalogue(repos.achievements.as_ref()).await?;
    info!(users = users.len(), definitions, "reference data seeded");
    Ok(())
}

/// Build the event dispatcher: achievements are evaluated before social
/// notifications so reward notices land first.
fn build_dispatcher(
    repos: &Repositories,
    push: Arc<dyn PushSender>,
    clock: &Arc<dyn Clock>,
) -> Arc<InProcessEventDispatcher> {
    let notifier: Arc<dyn UserNotifier> = Arc::new(NotificationDispatchService::new(
        repos.notifications.clone(),
        repos.push_tokens.clone(),
        push,
        clock.clone(),
    ));
    let evaluator = Arc::new(AchievementEvaluator::new(
        repos.achievements.clone(),
        repos.stats.clone(),
        clock.clone(),
    ));
    let handlers: Vec<Arc<dyn EventHandler>> = vec![
        Arc::new(GamificationHandler::new(evaluator, notifier.clone())),
        Arc::new(SocialNotificationHandler::new(repos.users.clone(), notifier)),
    ];
    Arc::new(InProcessEventDispatcher::new(handlers))
}

/// Build the HTTP state over `repos`, delivering pushes through `push`.
pub fn build_http_state(repos: &Repositories, push: Arc<dyn PushSender>) -> HttpState {
    build_http_state_with_clock(repos, push, Arc::new(DefaultClock))
}

/// As [`build_http_state`], reading time from `clock`.
pub fn build_http_state_with_clock(
    repos: &Repositories,
    push: Arc<dyn PushSender>,
    clock: Arc<dyn Clock>,
) -> HttpState {
    let dispatcher = build_dispatcher(repos, push, &clock);
    info!(handlers = ?dispatcher.handler_names(), "event dispatcher ready");

    let moods = Arc::new(MoodService::new(
        repos.moods.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));
    let posts = Arc::new(PostService::new(
        repos.posts.clone(),
        repos.friends.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));
    let friends = Arc::new(FriendService::new(
        repos.friends.clone(),
        repos.users.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));
    let chat = Arc::new(ChatService::new(
        repos.chats.clone(),
        repos.friends.clone(),
        dispatcher,
        clock.clone(),
    ));
    let notifications = Arc::new(NotificationService::new(
        repos.notifications.clone(),
        clock.clone(),
    ));

    HttpState {
        login: Arc::new(FixtureLoginService),
        profile: Arc::new(UserProfileService::new(repos.users.clone())),
        moods: moods.clone(),
        moods_query: moods,
        posts: posts.clone(),
        posts_query: posts,
        friends: friends.clone(),
        friends_query: friends,
        chat: chat.clone(),
        chat_query: chat,
        notifications: notifications.clone(),
        notifications_query: notifications,
        push_tokens: Arc::new(PushTokenService::new(repos.push_tokens.clone(), clock)),
        rewards: Arc::new(RewardService::new(repos.achievements.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CreatePostRequest, FIXTURE_ACCOUNTS, NoOpPushSender};
    use crate::domain::{NotificationKind, UserId, Visibility};
    use rstest::{fixture, rstest};

    #[fixture]
    fn repos() -> Repositories {
        Repositories::in_memory(Arc::new(InMemoryStore::new()))
    }

    fn ada() -> UserId {
        let account = FIXTURE_ACCOUNTS
            .iter()
            .find(|account| account.username == "ada")
            .expect("ada is a demo account");
        UserId::from_uuid(account.user_id)
    }

    #[rstest]
    #[tokio::test]
    async fn seeding_installs_users_and_catalogue(repos: Repositories) {
        seed_reference_data(&repos).await.expect("seed");
        let state = build_http_state(&repos, Arc::new(NoOpPushSender));

        let profile = state.profile.fetch_profile(&ada()).await.expect("profile");
        assert_eq!(profile.display_name().as_ref(), "Ada Lovelace");
        let achievements = state.rewards.list_achievements(&ada()).await.expect("list");
        assert!(!achievements.is_empty());
        assert!(achievements.iter().all(|status| !status.earned));
    }

    #[rstest]
    #[tokio::test]
    async fn seeding_twice_is_harmless(repos: Repositories) {
        seed_reference_data(&repos).await.expect("first seed");
        seed_reference_data(&repos).await.expect("second seed");
        let state = build_http_state(&repos, Arc::new(NoOpPushSender));
        let first = state.rewards.list_achievements(&ada()).await.expect("list");
        seed_reference_data(&repos).await.expect("third seed");
        let second = state.rewards.list_achievements(&ada()).await.expect("list");
        assert_eq!(first, second);
    }

    #[rstest]
    #[tokio::test]
    async fn first_post_flows_through_the_pipeline(repos: Repositories) {
        seed_reference_data(&repos).await.expect("seed");
        let state = build_http_state(&repos, Arc::new(NoOpPushSender));

        state
            .posts
            .create_post(CreatePostRequest {
                author_id: ada(),
                content: "Morning pour-over".into(),
                visibility: Visibility::Public,
                images: Vec::new(),
            })
            .await
            .expect("post created");

        let rewards = state.rewards.list_rewards(&ada()).await.expect("rewards");
        assert!(rewards.iter().any(|reward| reward.key == "first_post"));
        let inbox = state
            .notifications_query
            .list_notifications(&ada(), true)
            .await
            .expect("inbox");
        assert!(
            inbox
                .iter()
                .any(|notification| notification.kind == NotificationKind::RewardEarned)
        );
    }
}
