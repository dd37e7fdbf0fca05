//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health probes
//! - **Schemas**: domain payloads and the page envelopes from
//!   [`crate::inbound::http::schemas`]
//! - **Security**: Session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::ports::{AchievementStatus, RecordMoodResponse, RewardSummary};
use crate::domain::{
    Conversation, ConversationSummary, Error, ErrorCode, EventType, FriendRequest, FriendStatus,
    FriendSummary, Message, MoodCategory, MoodEntry, Notification, NotificationKind, Post,
    PostDetail, ReactionCount, ReactionToggle, RewardKind, StatField, User, Visibility,
};
use crate::inbound::http::chat::{OpenConversationBody, SendMessageBody};
use crate::inbound::http::friends::{RespondBody, SendFriendRequestBody};
use crate::inbound::http::moods::RecordMoodBody;
use crate::inbound::http::notifications::UnreadCount;
use crate::inbound::http::posts::{CreatePostBody, ReactionBody};
use crate::inbound::http::push_tokens::PushTokenBody;
use crate::inbound::http::schemas::{MessagePageSchema, PaginationLinksSchema, PostPageSchema};
use crate::inbound::http::users::LoginRequest;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "HomeCafé backend API",
        description = "Moods, posts, friends, chat, notifications and rewards for HomeCafé."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::moods::record_mood,
        crate::inbound::http::moods::list_moods,
        crate::inbound::http::moods::mood_for_date,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::list_feed,
        crate::inbound::http::posts::toggle_reaction,
        crate::inbound::http::friends::send_friend_request,
        crate::inbound::http::friends::respond_to_request,
        crate::inbound::http::friends::list_pending_requests,
        crate::inbound::http::friends::list_friends,
        crate::inbound::http::chat::open_conversation,
        crate::inbound::http::chat::list_conversations,
        crate::inbound::http::chat::list_messages,
        crate::inbound::http::chat::send_message,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::unread_count,
        crate::inbound::http::push_tokens::register_push_token,
        crate::inbound::http::push_tokens::unregister_push_token,
        crate::inbound::http::rewards::list_rewards,
        crate::inbound::http::rewards::list_achievements,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        LoginRequest,
        MoodCategory,
        MoodEntry,
        RecordMoodBody,
        RecordMoodResponse,
        Visibility,
        Post,
        PostDetail,
        ReactionCount,
        ReactionToggle,
        CreatePostBody,
        ReactionBody,
        PostPageSchema,
        PaginationLinksSchema,
        FriendStatus,
        FriendRequest,
        FriendSummary,
        SendFriendRequestBody,
        RespondBody,
        Conversation,
        ConversationSummary,
        Message,
        MessagePageSchema,
        OpenConversationBody,
        SendMessageBody,
        Notification,
        NotificationKind,
        UnreadCount,
        PushTokenBody,
        RewardKind,
        StatField,
        EventType,
        AchievementStatus,
        RewardSummary,
    )),
    tags(
        (name = "users", description = "Login, logout and the current user"),
        (name = "moods", description = "Daily mood journal"),
        (name = "posts", description = "Posts, the friends feed and reactions"),
        (name = "friends", description = "Friend requests and friendships"),
        (name = "chat", description = "Direct messages between friends"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "push", description = "Expo push token registration"),
        (name = "rewards", description = "Achievements and earned rewards"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure and path coverage.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId"])]
    #[case("User", &["id", "displayName"])]
    #[case("AchievementStatus", &["key", "earned", "grantedAt", "threshold"])]
    #[case("PostPageSchema", &["data", "nextCursor", "links"])]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema registered"));
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/moods/{date}")]
    #[case("/api/v1/feed")]
    #[case("/api/v1/posts/{id}/reactions")]
    #[case("/api/v1/friends/requests/{id}")]
    #[case("/api/v1/conversations/{id}/messages")]
    #[case("/api/v1/notifications/unread-count")]
    #[case("/api/v1/push-tokens")]
    #[case("/api/v1/rewards/achievements")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} documented");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
