//! Direct message handlers.
//!
//! ```text
//! POST /api/v1/conversations {"userId":"..."}
//! GET /api/v1/conversations
//! GET /api/v1/conversations/{id}/messages?limit=20&cursor=...
//! POST /api/v1/conversations/{id}/messages {"content":"See you at 10?"}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use pagination::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ListMessagesRequest;
use crate::domain::{Conversation, ConversationSummary, Error, Message, MessageKey, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::MessagePageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, decode_cursor, encode_cursor, invalid_uuid_error, page_limit, parse_uuid,
};

const CONVERSATION_ID: FieldName = FieldName::new("conversationId");

/// Body for `POST /api/v1/conversations`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenConversationBody {
    /// The friend to talk to.
    pub user_id: String,
}

/// Body for `POST /api/v1/conversations/{id}/messages`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendMessageBody {
    #[schema(example = "See you at 10?")]
    pub content: String,
}

/// Open a conversation with an accepted friend, or return the existing one.
#[utoipa::path(
    post,
    path = "/api/v1/conversations",
    request_body = OpenConversationBody,
    responses(
        (status = 200, description = "Conversation", body = Conversation),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not friends", body = Error)
    ),
    tags = ["chat"],
    operation_id = "openConversation"
)]
#[post("/conversations")]
pub async fn open_conversation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OpenConversationBody>,
) -> ApiResult<web::Json<Conversation>> {
    let user_id = session.require_user_id()?;
    let raw = payload.into_inner().user_id;
    let peer_id =
        UserId::new(&raw).map_err(|_| invalid_uuid_error(FieldName::new("userId"), &raw))?;
    let conversation = state.chat.open_conversation(&user_id, &peer_id).await?;
    Ok(web::Json(conversation))
}

/// The caller's conversations, most recently active first.
#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    responses(
        (status = 200, description = "Conversations", body = [ConversationSummary]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["chat"],
    operation_id = "listConversations"
)]
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let conversations = state.chat_query.list_conversations(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(conversations))
}

/// One page of messages, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    params(
        ("id" = String, Path, description = "Conversation id"),
        ("cursor" = Option<String>, Query, description = "Cursor from a previous page"),
        ("limit" = Option<usize>, Query, description = "Page size, 1 to 50, default 20")
    ),
    responses(
        (status = 200, description = "Message page", body = MessagePageSchema),
        (status = 400, description = "Invalid cursor or limit", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Conversation not found", body = Error)
    ),
    tags = ["chat"],
    operation_id = "listMessages"
)]
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let conversation_id = parse_uuid(&path, CONVERSATION_ID)?;
    let limit = page_limit(&query)?;
    let after = decode_cursor::<MessageKey>(&query)?;
    let page = state
        .chat_query
        .list_messages(ListMessagesRequest {
            user_id,
            conversation_id,
            after,
            limit,
        })
        .await?;
    let next_cursor = encode_cursor(page.next)?;
    let body = Paginated::new(page.messages, next_cursor, limit, &request.full_url());
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation id")),
    request_body = SendMessageBody,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Invalid message", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Conversation not found", body = Error)
    ),
    tags = ["chat"],
    operation_id = "sendMessage"
)]
#[post("/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SendMessageBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let conversation_id = parse_uuid(&path, CONVERSATION_ID)?;
    let message = state
        .chat
        .send_message(&user_id, conversation_id, payload.into_inner().content)
        .await?;
    Ok(HttpResponse::Created().json(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MessagePage;
    use crate::inbound::http::state::test_state::MockPorts;
    use crate::inbound::http::test_utils::{session_cookie, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn message(conversation_id: Uuid, sender: UserId, second: u32) -> Message {
        Message::restore(
            Uuid::new_v4(),
            conversation_id,
            sender,
            format!("message {second}"),
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, second)
                .single()
                .expect("timestamp"),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn opening_returns_the_conversation() {
        let (me, friend) = (UserId::random(), UserId::random());
        let mut ports = MockPorts::default();
        ports
            .chat
            .expect_open_conversation()
            .withf(move |user, peer| *user == me && *peer == friend)
            .returning(|user, peer| {
                Ok(Conversation::between(Uuid::new_v4(), *user, *peer, Utc::now())
                    .expect("distinct users"))
            });
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(open_conversation)),
        )
        .await;
        let cookie = session_cookie(&app, &me).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/conversations")
                .cookie(cookie)
                .set_json(json!({"userId": friend.to_string()}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn strangers_cannot_open_conversations() {
        let mut ports = MockPorts::default();
        ports
            .chat
            .expect_open_conversation()
            .returning(|_, _| Err(Error::forbidden("only friends can chat")));
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(open_conversation)),
        )
        .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/conversations")
                .cookie(cookie)
                .set_json(json!({"userId": UserId::random().to_string()}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[rstest]
    #[actix_web::test]
    async fn message_page_carries_next_cursor() {
        let me = UserId::random();
        let conversation_id = Uuid::new_v4();
        let page = vec![
            message(conversation_id, me, 2),
            message(conversation_id, me, 1),
        ];
        let next = page.last().map(Message::key);
        let mut ports = MockPorts::default();
        ports
            .chat_query
            .expect_list_messages()
            .withf(move |req| {
                req.user_id == me
                    && req.conversation_id == conversation_id
                    && req.limit == pagination::DEFAULT_LIMIT
            })
            .returning(move |_| {
                Ok(MessagePage {
                    messages: page.clone(),
                    next,
                })
            });
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(list_messages)),
        )
        .await;
        let cookie = session_cookie(&app, &me).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/conversations/{conversation_id}/messages"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["data"][0]["content"], "message 2");
        assert!(body["nextCursor"].is_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn last_page_has_no_next_link() {
        let mut ports = MockPorts::default();
        ports.chat_query.expect_list_messages().returning(|_| {
            Ok(MessagePage {
                messages: Vec::new(),
                next: None,
            })
        });
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(list_messages)),
        )
        .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/conversations/{}/messages", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert!(body.get("nextCursor").is_none());
        assert!(body["links"].get("next").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn sending_returns_created() {
        let me = UserId::random();
        let conversation_id = Uuid::new_v4();
        let mut ports = MockPorts::default();
        ports
            .chat
            .expect_send_message()
            .withf(move |_, id, content| *id == conversation_id && content == "See you at 10?")
            .returning(move |user, id, _| Ok(message(id, *user, 5)));
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(send_message)),
        )
        .await;
        let cookie = session_cookie(&app, &me).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/conversations/{conversation_id}/messages"))
                .cookie(cookie)
                .set_json(json!({"content": "See you at 10?"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }
}
