//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! with `diesel print-schema`).

diesel::table! {
    /// Registered users. Display names are shown next to posts and friends.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Journal and social posts.
    posts (id) {
        id -> Uuid,
        author_id -> Uuid,
        content -> Text,
        /// `public` or `private`.
        visibility -> Varchar,
        images -> Array<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (post, user, emoji).
    post_reactions (post_id, user_id, emoji) {
        post_id -> Uuid,
        user_id -> Uuid,
        emoji -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Daily mood entries, unique per (user, mood_date).
    mood_entries (id) {
        id -> Uuid,
        user_id -> Uuid,
        mood_date -> Date,
        category -> Varchar,
        intensity -> Int2,
        note -> Nullable<Text>,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Friend requests, unique per (sender, receiver).
    friend_requests (id) {
        id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        /// `pending`, `accepted` or `rejected`.
        status -> Varchar,
        created_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Direct conversations. `participant_a` sorts before `participant_b`.
    conversations (id) {
        id -> Uuid,
        participant_a -> Uuid,
        participant_b -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        sender_id -> Uuid,
        content -> Text,
        sent_at -> Timestamptz,
    }
}

diesel::table! {
    /// In-app notification inbox.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Varchar,
        title -> Text,
        body -> Text,
        data -> Jsonb,
        created_at -> Timestamptz,
        read_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Expo push tokens; a token belongs to one user at a time.
    push_tokens (token) {
        token -> Varchar,
        user_id -> Uuid,
        registered_at -> Timestamptz,
    }
}

diesel::table! {
    /// Achievement catalogue. `criteria` holds
    /// `{"eventType", "threshold", "field"}`.
    achievement_definitions (id) {
        id -> Uuid,
        key -> Varchar,
        reward_kind -> Varchar,
        name -> Text,
        description -> Text,
        criteria -> Jsonb,
    }
}

diesel::table! {
    /// Rewards granted to users, unique per (user, achievement).
    user_rewards (id) {
        id -> Uuid,
        user_id -> Uuid,
        achievement_id -> Uuid,
        granted_at -> Timestamptz,
    }
}

diesel::joinable!(post_reactions -> posts (post_id));
diesel::joinable!(messages -> conversations (conversation_id));
diesel::joinable!(user_rewards -> achievement_definitions (achievement_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    posts,
    post_reactions,
    mood_entries,
    friend_requests,
    conversations,
    messages,
    notifications,
    push_tokens,
    achievement_definitions,
    user_rewards,
);
