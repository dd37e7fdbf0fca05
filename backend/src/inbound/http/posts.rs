//! Post, feed and reaction handlers.
//!
//! ```text
//! POST /api/v1/posts {"content":"Morning latte","visibility":"public"}
//! GET /api/v1/posts/{id}
//! DELETE /api/v1/posts/{id}
//! GET /api/v1/feed?limit=20&cursor=...
//! POST /api/v1/posts/{id}/reactions {"emoji":"☕"}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use pagination::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreatePostRequest, FeedRequest};
use crate::domain::{Error, FeedKey, Post, PostDetail, ReactionToggle, Visibility};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::PostPageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, decode_cursor, encode_cursor, page_limit, parse_uuid,
};

/// Body for `POST /api/v1/posts`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    #[schema(example = "Morning latte on the balcony")]
    pub content: String,
    #[serde(default)]
    pub visibility: Visibility,
    /// HTTPS image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Body for `POST /api/v1/posts/{id}/reactions`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReactionBody {
    #[schema(example = "☕")]
    pub emoji: String,
}

const POST_ID: FieldName = FieldName::new("postId");

/// Publish a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostBody,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostBody>,
) -> ApiResult<HttpResponse> {
    let author_id = session.require_user_id()?;
    let body = payload.into_inner();
    let post = state
        .posts
        .create_post(CreatePostRequest {
            author_id,
            content: body.content,
            visibility: body.visibility,
            images: body.images,
        })
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// A post with its reaction tallies.
///
/// Private posts of non-friends are reported as missing.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = PostDetail),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let viewer_id = session.require_user_id()?;
    let post_id = parse_uuid(&path, POST_ID)?;
    let detail = state.posts_query.get_post(&viewer_id, post_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(detail))
}

/// Delete one of the caller's posts.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let post_id = parse_uuid(&path, POST_ID)?;
    state.posts.delete_post(&user_id, post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller's posts and their friends' posts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    params(
        ("cursor" = Option<String>, Query, description = "Cursor from a previous page"),
        ("limit" = Option<usize>, Query, description = "Page size, 1 to 50, default 20")
    ),
    responses(
        (status = 200, description = "Feed page", body = PostPageSchema),
        (status = 400, description = "Invalid cursor or limit", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listFeed"
)]
#[get("/feed")]
pub async fn list_feed(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    query: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let viewer_id = session.require_user_id()?;
    let limit = page_limit(&query)?;
    let after = decode_cursor::<FeedKey>(&query)?;
    let page = state
        .posts_query
        .list_feed(FeedRequest {
            viewer_id,
            after,
            limit,
        })
        .await?;
    let next_cursor = encode_cursor(page.next)?;
    let body = Paginated::new(page.posts, next_cursor, limit, &request.full_url());
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(body))
}

/// Add the caller's reaction, or remove it when already present.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/reactions",
    params(("id" = String, Path, description = "Post id")),
    request_body = ReactionBody,
    responses(
        (status = 200, description = "Reaction toggled", body = ReactionToggle),
        (status = 400, description = "Invalid emoji", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "toggleReaction"
)]
#[post("/posts/{id}/reactions")]
pub async fn toggle_reaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReactionBody>,
) -> ApiResult<web::Json<ReactionToggle>> {
    let user_id = session.require_user_id()?;
    let post_id = parse_uuid(&path, POST_ID)?;
    let toggle = state
        .posts
        .toggle_reaction(&user_id, post_id, payload.into_inner().emoji)
        .await?;
    Ok(web::Json(toggle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FeedPage;
    use crate::domain::{Emoji, PostDraft, UserId};
    use crate::inbound::http::state::test_state::MockPorts;
    use crate::inbound::http::test_utils::{session_cookie, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use pagination::Cursor;
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn post_by(author_id: UserId, minute: u32) -> Post {
        Post::new(PostDraft {
            id: Uuid::new_v4(),
            author_id,
            content: format!("post {minute}"),
            visibility: Visibility::Public,
            images: Vec::new(),
            created_at: Utc
                .with_ymd_and_hms(2026, 3, 14, 9, minute, 0)
                .single()
                .expect("timestamp"),
        })
        .expect("valid post")
    }

    #[rstest]
    #[actix_web::test]
    async fn create_defaults_to_public() {
        let author = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .posts
            .expect_create_post()
            .withf(move |req| {
                req.author_id == author
                    && req.visibility == Visibility::Public
                    && req.images.is_empty()
            })
            .times(1)
            .returning(|req| Ok(post_by(req.author_id, 30)));
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(create_post)),
        )
        .await;
        let cookie = session_cookie(&app, &author).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/posts")
                .cookie(cookie)
                .set_json(json!({"content": "post 30"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["visibility"], "public");
        assert_eq!(body["authorId"], author.to_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_post_id_is_rejected() {
        let app = actix_test::init_service(
            test_app(MockPorts::default().into()).service(web::scope("/api/v1").service(get_post)),
        )
        .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/posts/not-a-uuid")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "postId");
    }

    #[rstest]
    #[actix_web::test]
    async fn hidden_post_is_not_found() {
        let mut ports = MockPorts::default();
        ports
            .posts_query
            .expect_get_post()
            .returning(|_, _| Err(Error::not_found("post not found")));
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(get_post)),
        )
        .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/posts/{}", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_returns_no_content() {
        let post_id = Uuid::new_v4();
        let mut ports = MockPorts::default();
        ports
            .posts
            .expect_delete_post()
            .withf(move |_, id| *id == post_id)
            .times(1)
            .returning(|_, _| Ok(()));
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(delete_post)),
        )
        .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/posts/{post_id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[actix_web::test]
    async fn feed_returns_cursor_and_links() {
        let viewer = UserId::random();
        let newest = post_by(viewer, 40);
        let older = post_by(viewer, 20);
        let next_key = older.feed_key();
        let page_posts = vec![newest, older];
        let mut ports = MockPorts::default();
        ports
            .posts_query
            .expect_list_feed()
            .withf(move |req| req.viewer_id == viewer && req.limit == 2 && req.after.is_none())
            .times(1)
            .returning(move |_| {
                Ok(FeedPage {
                    posts: page_posts.clone(),
                    next: Some(next_key),
                })
            });
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(list_feed)),
        )
        .await;
        let cookie = session_cookie(&app, &viewer).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/feed?limit=2")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
        let cursor = body["nextCursor"].as_str().expect("next cursor");
        let decoded: Cursor<FeedKey> = Cursor::decode(cursor).expect("decodable cursor");
        assert_eq!(decoded.into_key(), next_key);
        let next = body["links"]["next"].as_str().expect("next link");
        assert!(next.contains("limit=2"));
        assert!(next.contains("cursor="));
    }

    #[rstest]
    #[case("/api/v1/feed?limit=0")]
    #[case("/api/v1/feed?limit=51")]
    #[case("/api/v1/feed?cursor=!!!")]
    #[actix_web::test]
    async fn feed_rejects_bad_page_params(#[case] uri: &str) {
        let app = actix_test::init_service(
            test_app(MockPorts::default().into()).service(web::scope("/api/v1").service(list_feed)),
        )
        .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(uri)
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn reaction_toggle_is_passed_through() {
        let mut ports = MockPorts::default();
        ports
            .posts
            .expect_toggle_reaction()
            .withf(|_, _, emoji| emoji == "☕")
            .returning(|_, _, emoji| {
                Ok(ReactionToggle {
                    emoji: Emoji::new(emoji).expect("emoji"),
                    added: true,
                    count: 1,
                })
            });
        let app = actix_test::init_service(
            test_app(ports.into()).service(web::scope("/api/v1").service(toggle_reaction)),
        )
        .await;
        let cookie = session_cookie(&app, &UserId::random()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/posts/{}/reactions", Uuid::new_v4()))
                .cookie(cookie)
                .set_json(json!({"emoji": "☕"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({"emoji": "☕", "added": true, "count": 1}));
    }
}
