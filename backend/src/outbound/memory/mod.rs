//! In-process adapter implementing every repository port.
//!
//! Backs the server when no database URL is configured and drives the HTTP
//! integration tests. The uniqueness rules the PostgreSQL schema enforces
//! with constraints (one mood per user and day, one reward per user and
//! achievement, one conversation per pair) are enforced here under a single
//! lock, so concurrent grants still observe `AlreadyGranted`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::ports::{
    AchievementRepository, AchievementRepositoryError, ActivityStatsRepository,
    ActivityStatsRepositoryError, ChatRepository, ChatRepositoryError, FriendRepository,
    FriendRepositoryError, MoodRepository, MoodRepositoryError, MoodUpsert,
    NotificationRepository, NotificationRepositoryError, PostRepository, PostRepositoryError,
    PushTokenRepository, PushTokenRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AchievementDefinition, AchievementDefinitionDraft, Conversation, ConversationSummary,
    EarnedReward, Emoji, EventType, FeedKey, FriendRequest, FriendStatus, FriendSummary, Message,
    MessageKey, MoodEntry, MoodEntryDraft, Notification, Post, PushToken, ReactionCount,
    RewardGrant, StatField, User, UserId, UserReward, ordered_pair,
};

#[derive(Debug, Clone)]
struct Reaction {
    post_id: Uuid,
    user_id: UserId,
    emoji: Emoji,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    posts: HashMap<Uuid, Post>,
    reactions: Vec<Reaction>,
    moods: HashMap<(UserId, NaiveDate), MoodEntry>,
    friend_requests: HashMap<Uuid, FriendRequest>,
    conversations: HashMap<Uuid, Conversation>,
    messages: Vec<Message>,
    notifications: HashMap<Uuid, Notification>,
    push_tokens: HashMap<PushToken, UserId>,
    definitions: BTreeMap<String, AchievementDefinition>,
    rewards: Vec<UserReward>,
}

impl State {
    fn accepted_with(&self, user_id: &UserId) -> impl Iterator<Item = &FriendRequest> {
        self.friend_requests.values().filter(move |request| {
            request.status() == FriendStatus::Accepted
                && (request.sender_id() == user_id || request.receiver_id() == user_id)
        })
    }

    fn display_name(&self, user_id: &UserId) -> String {
        self.users
            .get(user_id)
            .map(|user| user.display_name().to_string())
            .unwrap_or_default()
    }
}

fn peer_of(request: &FriendRequest, user_id: &UserId) -> UserId {
    if request.sender_id() == user_id {
        *request.receiver_id()
    } else {
        *request.sender_id()
    }
}

fn usize_to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Shared in-memory store; clone the `Arc` it is wrapped in, not the store.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.state.lock().await;
        state.users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }
}

#[async_trait]
impl MoodRepository for InMemoryStore {
    async fn upsert(&self, entry: &MoodEntry) -> Result<MoodUpsert, MoodRepositoryError> {
        let mut state = self.state.lock().await;
        let key = (*entry.user_id(), entry.mood_date());
        let Some(existing) = state.moods.get(&key) else {
            state.moods.insert(key, entry.clone());
            return Ok(MoodUpsert {
                entry: entry.clone(),
                created: true,
            });
        };

        let updated = MoodEntry::new(MoodEntryDraft {
            id: existing.id(),
            user_id: *entry.user_id(),
            mood_date: entry.mood_date(),
            category: entry.category(),
            intensity: entry.intensity(),
            note: entry.note().map(str::to_owned),
            recorded_at: entry.recorded_at(),
        })
        .map_err(|err| MoodRepositoryError::query(err.to_string()))?;
        state.moods.insert(key, updated.clone());
        Ok(MoodUpsert {
            entry: updated,
            created: false,
        })
    }

    async fn list_range(
        &self,
        user_id: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodEntry>, MoodRepositoryError> {
        let state = self.state.lock().await;
        let mut entries: Vec<MoodEntry> = state
            .moods
            .values()
            .filter(|entry| {
                entry.user_id() == user_id && (from..=to).contains(&entry.mood_date())
            })
            .cloned()
            .collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.mood_date()));
        Ok(entries)
    }

    async fn find_for_date(
        &self,
        user_id: &UserId,
        mood_date: NaiveDate,
    ) -> Result<Option<MoodEntry>, MoodRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.moods.get(&(*user_id, mood_date)).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut state = self.state.lock().await;
        state.posts.insert(post.id(), post.clone());
        Ok(())
    }

    async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>, PostRepositoryError> {
        Ok(self.state.lock().await.posts.get(&post_id).cloned())
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool, PostRepositoryError> {
        let mut state = self.state.lock().await;
        let removed = state.posts.remove(&post_id).is_some();
        state.reactions.retain(|reaction| reaction.post_id != post_id);
        Ok(removed)
    }

    async fn feed_page(
        &self,
        authors: &[UserId],
        before: Option<FeedKey>,
        limit: usize,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let state = self.state.lock().await;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|post| authors.contains(post.author_id()))
            .filter(|post| {
                before.is_none_or(|key| key.precedes(post.created_at(), post.id()))
            })
            .cloned()
            .collect();
        posts.sort_by_key(|post| std::cmp::Reverse((post.created_at(), post.id())));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn add_reaction(
        &self,
        post_id: Uuid,
        user_id: &UserId,
        emoji: &Emoji,
        _reacted_at: DateTime<Utc>,
    ) -> Result<bool, PostRepositoryError> {
        let mut state = self.state.lock().await;
        let exists = state.reactions.iter().any(|reaction| {
            reaction.post_id == post_id && reaction.user_id == *user_id && reaction.emoji == *emoji
        });
        if !exists {
            state.reactions.push(Reaction {
                post_id,
                user_id: *user_id,
                emoji: emoji.clone(),
            });
        }
        Ok(!exists)
    }

    async fn remove_reaction(
        &self,
        post_id: Uuid,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<bool, PostRepositoryError> {
        let mut state = self.state.lock().await;
        let before = state.reactions.len();
        state.reactions.retain(|reaction| {
            !(reaction.post_id == post_id
                && reaction.user_id == *user_id
                && reaction.emoji == *emoji)
        });
        Ok(state.reactions.len() < before)
    }

    async fn reaction_counts(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<ReactionCount>, PostRepositoryError> {
        let state = self.state.lock().await;
        let mut tallies: BTreeMap<String, (Emoji, u64)> = BTreeMap::new();
        for reaction in state.reactions.iter().filter(|r| r.post_id == post_id) {
            tallies
                .entry(reaction.emoji.as_str().to_owned())
                .or_insert_with(|| (reaction.emoji.clone(), 0))
                .1 += 1;
        }
        let mut counts: Vec<ReactionCount> = tallies
            .into_values()
            .map(|(emoji, count)| ReactionCount { emoji, count })
            .collect();
        // Stable sort keeps the emoji order for ties.
        counts.sort_by_key(|count| std::cmp::Reverse(count.count));
        Ok(counts)
    }
}

#[async_trait]
impl FriendRepository for InMemoryStore {
    async fn find_request(
        &self,
        sender_id: &UserId,
        receiver_id: &UserId,
    ) -> Result<Option<FriendRequest>, FriendRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .friend_requests
            .values()
            .find(|request| {
                request.sender_id() == sender_id && request.receiver_id() == receiver_id
            })
            .cloned())
    }

    async fn find_by_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<FriendRequest>, FriendRepositoryError> {
        Ok(self.state.lock().await.friend_requests.get(&request_id).cloned())
    }

    async fn insert(&self, request: &FriendRequest) -> Result<(), FriendRepositoryError> {
        let mut state = self.state.lock().await;
        let duplicate = state.friend_requests.values().any(|existing| {
            let same_direction = existing.sender_id() == request.sender_id()
                && existing.receiver_id() == request.receiver_id();
            let crossing = existing.sender_id() == request.receiver_id()
                && existing.receiver_id() == request.sender_id()
                && existing.status() != FriendStatus::Rejected;
            same_direction || crossing
        });
        if duplicate {
            return Err(FriendRepositoryError::duplicate());
        }
        state.friend_requests.insert(request.id(), request.clone());
        Ok(())
    }

    async fn update_status(&self, request: &FriendRequest) -> Result<(), FriendRepositoryError> {
        let mut state = self.state.lock().await;
        match state.friend_requests.get_mut(&request.id()) {
            Some(stored) => {
                *stored = request.clone();
                Ok(())
            }
            None => Err(FriendRepositoryError::query("friend request not found")),
        }
    }

    async fn delete(&self, request_id: Uuid) -> Result<(), FriendRepositoryError> {
        self.state.lock().await.friend_requests.remove(&request_id);
        Ok(())
    }

    async fn list_friends(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FriendSummary>, FriendRepositoryError> {
        let state = self.state.lock().await;
        let mut friends: Vec<FriendSummary> = state
            .accepted_with(user_id)
            .map(|request| {
                let peer = peer_of(request, user_id);
                FriendSummary {
                    user_id: peer,
                    display_name: state.display_name(&peer),
                    since: request.responded_at().unwrap_or(request.created_at()),
                }
            })
            .collect();
        friends.sort_by(|a, b| b.since.cmp(&a.since));
        Ok(friends)
    }

    async fn list_incoming_pending(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FriendRequest>, FriendRepositoryError> {
        let state = self.state.lock().await;
        let mut pending: Vec<FriendRequest> = state
            .friend_requests
            .values()
            .filter(|request| {
                request.receiver_id() == user_id && request.status() == FriendStatus::Pending
            })
            .cloned()
            .collect();
        pending.sort_by_key(|request| std::cmp::Reverse(request.created_at()));
        Ok(pending)
    }

    async fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool, FriendRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .accepted_with(a)
            .any(|request| peer_of(request, a) == *b))
    }

    async fn friend_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, FriendRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .accepted_with(user_id)
            .map(|request| peer_of(request, user_id))
            .collect())
    }
}

#[async_trait]
impl ChatRepository for InMemoryStore {
    async fn find_conversation(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, ChatRepositoryError> {
        let pair = ordered_pair(*a, *b);
        let state = self.state.lock().await;
        Ok(state
            .conversations
            .values()
            .find(|conversation| conversation.participants() == pair)
            .cloned())
    }

    async fn insert_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), ChatRepositoryError> {
        let mut state = self.state.lock().await;
        let pair = conversation.participants();
        if state
            .conversations
            .values()
            .any(|existing| existing.participants() == pair)
        {
            return Err(ChatRepositoryError::duplicate());
        }
        state
            .conversations
            .insert(conversation.id(), conversation.clone());
        Ok(())
    }

    async fn find_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, ChatRepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .conversations
            .get(&conversation_id)
            .cloned())
    }

    async fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, ChatRepositoryError> {
        let state = self.state.lock().await;
        let mut summaries: Vec<ConversationSummary> = state
            .conversations
            .values()
            .filter_map(|conversation| {
                let peer_id = conversation.peer_of(user_id)?;
                let last_message = state
                    .messages
                    .iter()
                    .filter(|message| message.conversation_id() == conversation.id())
                    .max_by_key(|message| (message.sent_at(), message.id()))
                    .cloned();
                Some(ConversationSummary {
                    id: conversation.id(),
                    peer_id,
                    created_at: conversation.created_at(),
                    last_message,
                })
            })
            .collect();
        summaries.sort_by_key(|summary| std::cmp::Reverse(summary.last_activity()));
        Ok(summaries)
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ChatRepositoryError> {
        self.state.lock().await.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        before: Option<MessageKey>,
        limit: usize,
    ) -> Result<Vec<Message>, ChatRepositoryError> {
        let state = self.state.lock().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|message| message.conversation_id() == conversation_id)
            .filter(|message| {
                before.is_none_or(|key| key.precedes(message.sent_at(), message.id()))
            })
            .cloned()
            .collect();
        messages.sort_by_key(|message| std::cmp::Reverse((message.sent_at(), message.id())));
        messages.truncate(limit);
        Ok(messages)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut state = self.state.lock().await;
        state
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let state = self.state.lock().await;
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.user_id == *user_id && (!unread_only || !n.is_read()))
            .cloned()
            .collect();
        notifications.sort_by_key(|n| std::cmp::Reverse((n.created_at, n.id)));
        notifications.truncate(limit);
        Ok(notifications)
    }

    async fn find_by_id(
        &self,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        Ok(self
            .state
            .lock()
            .await
            .notifications
            .get(&notification_id)
            .cloned())
    }

    async fn mark_read(
        &self,
        notification_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<(), NotificationRepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(notification) = state.notifications.get_mut(&notification_id) {
            notification.read_at.get_or_insert(read_at);
        }
        Ok(())
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let state = self.state.lock().await;
        let count = state
            .notifications
            .values()
            .filter(|n| n.user_id == *user_id && !n.is_read())
            .count();
        Ok(usize_to_u64(count))
    }
}

#[async_trait]
impl PushTokenRepository for InMemoryStore {
    async fn upsert(
        &self,
        token: &PushToken,
        user_id: &UserId,
        _registered_at: DateTime<Utc>,
    ) -> Result<(), PushTokenRepositoryError> {
        let mut state = self.state.lock().await;
        state.push_tokens.insert(token.clone(), *user_id);
        Ok(())
    }

    async fn delete_for_user(
        &self,
        token: &PushToken,
        user_id: &UserId,
    ) -> Result<bool, PushTokenRepositoryError> {
        let mut state = self.state.lock().await;
        if state.push_tokens.get(token) == Some(user_id) {
            state.push_tokens.remove(token);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete(&self, token: &PushToken) -> Result<(), PushTokenRepositoryError> {
        self.state.lock().await.push_tokens.remove(token);
        Ok(())
    }

    async fn tokens_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PushToken>, PushTokenRepositoryError> {
        let state = self.state.lock().await;
        let mut tokens: Vec<PushToken> = state
            .push_tokens
            .iter()
            .filter(|(_, owner)| *owner == user_id)
            .map(|(token, _)| token.clone())
            .collect();
        tokens.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(tokens)
    }
}

#[async_trait]
impl AchievementRepository for InMemoryStore {
    async fn upsert_definitions(
        &self,
        definitions: &[AchievementDefinition],
    ) -> Result<(), AchievementRepositoryError> {
        let mut state = self.state.lock().await;
        for definition in definitions {
            let key = definition.key().as_str().to_owned();
            // An existing row keeps its id so granted rewards stay attached.
            let stored = match state.definitions.get(&key) {
                Some(existing) if existing.id() != definition.id() => {
                    AchievementDefinition::new(AchievementDefinitionDraft {
                        id: existing.id(),
                        key: key.clone(),
                        reward_kind: definition.reward_kind(),
                        name: definition.name().to_owned(),
                        description: definition.description().to_owned(),
                        criteria: *definition.criteria(),
                    })
                    .map_err(|err| AchievementRepositoryError::query(err.to_string()))?
                }
                _ => definition.clone(),
            };
            state.definitions.insert(key, stored);
        }
        Ok(())
    }

    async fn list_definitions(
        &self,
    ) -> Result<Vec<AchievementDefinition>, AchievementRepositoryError> {
        Ok(self.state.lock().await.definitions.values().cloned().collect())
    }

    async fn definitions_for_event(
        &self,
        event_type: EventType,
    ) -> Result<Vec<AchievementDefinition>, AchievementRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .definitions
            .values()
            .filter(|definition| definition.criteria().event_type() == event_type)
            .cloned()
            .collect())
    }

    async fn earned_achievement_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, AchievementRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .rewards
            .iter()
            .filter(|reward| reward.user_id == *user_id)
            .map(|reward| reward.achievement_id)
            .collect())
    }

    async fn grant_reward(
        &self,
        user_id: &UserId,
        achievement_id: Uuid,
        granted_at: DateTime<Utc>,
    ) -> Result<RewardGrant, AchievementRepositoryError> {
        let mut state = self.state.lock().await;
        let held = state
            .rewards
            .iter()
            .any(|reward| reward.user_id == *user_id && reward.achievement_id == achievement_id);
        if held {
            return Ok(RewardGrant::AlreadyGranted);
        }
        let reward = UserReward {
            id: Uuid::new_v4(),
            user_id: *user_id,
            achievement_id,
            granted_at,
        };
        state.rewards.push(reward.clone());
        Ok(RewardGrant::Granted(reward))
    }

    async fn list_rewards(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EarnedReward>, AchievementRepositoryError> {
        let state = self.state.lock().await;
        let mut earned: Vec<EarnedReward> = state
            .rewards
            .iter()
            .filter(|reward| reward.user_id == *user_id)
            .filter_map(|reward| {
                state
                    .definitions
                    .values()
                    .find(|definition| definition.id() == reward.achievement_id)
                    .map(|definition| EarnedReward {
                        reward: reward.clone(),
                        definition: definition.clone(),
                    })
            })
            .collect();
        earned.sort_by_key(|item| std::cmp::Reverse(item.reward.granted_at));
        Ok(earned)
    }
}

#[async_trait]
impl ActivityStatsRepository for InMemoryStore {
    async fn count(
        &self,
        user_id: &UserId,
        field: StatField,
    ) -> Result<u64, ActivityStatsRepositoryError> {
        let state = self.state.lock().await;
        let count = match field {
            StatField::PostCount => state
                .posts
                .values()
                .filter(|post| post.author_id() == user_id)
                .count(),
            StatField::MoodCount => state
                .moods
                .keys()
                .filter(|(owner, _)| owner == user_id)
                .count(),
            StatField::FriendCount => state.accepted_with(user_id).count(),
            StatField::ReactionsGiven => state
                .reactions
                .iter()
                .filter(|reaction| reaction.user_id == *user_id)
                .count(),
            StatField::ReactionsReceived => state
                .reactions
                .iter()
                .filter(|reaction| {
                    state
                        .posts
                        .get(&reaction.post_id)
                        .is_some_and(|post| post.author_id() == user_id)
                })
                .count(),
            StatField::MessagesSent => state
                .messages
                .iter()
                .filter(|message| message.sender_id() == user_id)
                .count(),
        };
        Ok(usize_to_u64(count))
    }
}
