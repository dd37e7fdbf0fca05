//! HTTP behaviour of the social surface: visibility, feed paging, reactions,
//! chat, the notification inbox, push tokens and sessions.

mod support;

use std::collections::HashSet;

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use homecafe::domain::TRACE_ID_HEADER;
use support::{befriend, login, reward_keys, seeded_app, send, user_id};

fn ids(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .expect("page data")
        .iter()
        .filter_map(|item| item["id"].as_str().map(str::to_owned))
        .collect()
}

#[rstest]
#[actix_web::test]
async fn private_posts_are_visible_to_friends_only() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let grace = login(&app, "grace").await;
    let alan = login(&app, "alan").await;
    befriend(&app, &ada, &grace, &user_id("grace")).await;

    let (status, post) = send(
        &app,
        &ada,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .set_json(json!({"content": "Secret scone recipe", "visibility": "private"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().expect("post id"));

    let (owner, _) = send(&app, &ada, test::TestRequest::get().uri(&uri)).await;
    let (friend, _) = send(&app, &grace, test::TestRequest::get().uri(&uri)).await;
    let (stranger, _) = send(&app, &alan, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(owner, StatusCode::OK);
    assert_eq!(friend, StatusCode::OK);
    assert_eq!(stranger, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn feed_pages_follow_the_cursor_without_overlap() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let grace = login(&app, "grace").await;
    befriend(&app, &ada, &grace, &user_id("grace")).await;

    for n in 0..5 {
        let author = if n % 2 == 0 { &ada } else { &grace };
        send(
            &app,
            author,
            test::TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"content": format!("brew {n}")})),
        )
        .await;
    }

    let mut seen = Vec::new();
    let mut uri = "/api/v1/feed?limit=2".to_owned();
    loop {
        let (status, page) = send(&app, &grace, test::TestRequest::get().uri(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        seen.extend(ids(&page));
        match page["nextCursor"].as_str() {
            Some(cursor) => uri = format!("/api/v1/feed?limit=2&cursor={cursor}"),
            None => break,
        }
    }
    assert_eq!(seen.len(), 5);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 5);
}

#[rstest]
#[actix_web::test]
async fn feed_rejects_oversized_pages() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let (status, body) = send(&app, &ada, test::TestRequest::get().uri("/api/v1/feed?limit=51")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn toggling_a_reaction_twice_restores_the_tally() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let (_, post) = send(
        &app,
        &ada,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .set_json(json!({"content": "Cardamom bun"})),
    )
    .await;
    let post_uri = format!("/api/v1/posts/{}", post["id"].as_str().expect("post id"));
    let react = || {
        test::TestRequest::post()
            .uri(&format!("{post_uri}/reactions"))
            .set_json(json!({"emoji": "🥐"}))
    };

    let (_, first) = send(&app, &ada, react()).await;
    let (_, second) = send(&app, &ada, react()).await;
    assert_eq!(first["added"], true);
    assert_eq!(first["count"], 1);
    assert_eq!(second["added"], false);
    assert_eq!(second["count"], 0);

    let (_, detail) = send(&app, &ada, test::TestRequest::get().uri(&post_uri)).await;
    assert_eq!(detail["reactions"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn only_the_author_deletes_a_post() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let grace = login(&app, "grace").await;
    let (_, post) = send(
        &app,
        &ada,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .set_json(json!({"content": "Cold brew"})),
    )
    .await;
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().expect("post id"));

    let (forbidden, _) = send(&app, &grace, test::TestRequest::delete().uri(&uri)).await;
    let (deleted, _) = send(&app, &ada, test::TestRequest::delete().uri(&uri)).await;
    let (gone, _) = send(&app, &ada, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(forbidden, StatusCode::FORBIDDEN);
    assert_eq!(deleted, StatusCode::NO_CONTENT);
    assert_eq!(gone, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn friend_requests_reject_duplicates_and_self() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let request = |target: String| {
        test::TestRequest::post()
            .uri("/api/v1/friends/requests")
            .set_json(json!({"userId": target}))
    };

    let (own, _) = send(&app, &ada, request(user_id("ada").to_string())).await;
    let (first, _) = send(&app, &ada, request(user_id("alan").to_string())).await;
    let (again, _) = send(&app, &ada, request(user_id("alan").to_string())).await;
    assert_eq!(own, StatusCode::BAD_REQUEST);
    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(again, StatusCode::CONFLICT);

    let alan = login(&app, "alan").await;
    let (_, pending) = send(
        &app,
        &alan,
        test::TestRequest::get().uri("/api/v1/friends/requests"),
    )
    .await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn crossing_requests_form_one_friendship() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let alan = login(&app, "alan").await;
    let request = |target: String| {
        test::TestRequest::post()
            .uri("/api/v1/friends/requests")
            .set_json(json!({"userId": target}))
    };

    let (status, outgoing) = send(&app, &ada, request(user_id("alan").to_string())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, crossing) = send(&app, &alan, request(user_id("ada").to_string())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(crossing["id"], outgoing["id"]);
    assert_eq!(crossing["status"], "accepted");

    let request_id = outgoing["id"].as_str().expect("request id").to_owned();
    let (status, _) = send(
        &app,
        &alan,
        test::TestRequest::post()
            .uri(&format!("/api/v1/friends/requests/{request_id}"))
            .set_json(json!({"accept": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for cookie in [&ada, &alan] {
        let (_, friends) = send(&app, cookie, test::TestRequest::get().uri("/api/v1/friends")).await;
        assert_eq!(friends.as_array().map(Vec::len), Some(1));
    }
}

#[rstest]
#[actix_web::test]
async fn chat_requires_friendship_then_delivers_messages() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let grace = login(&app, "grace").await;
    let open = || {
        test::TestRequest::post()
            .uri("/api/v1/conversations")
            .set_json(json!({"userId": user_id("grace").to_string()}))
    };

    let (status, _) = send(&app, &ada, open()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    befriend(&app, &ada, &grace, &user_id("grace")).await;
    let (status, conversation) = send(&app, &ada, open()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, reopened) = send(&app, &ada, open()).await;
    assert_eq!(reopened["id"], conversation["id"]);
    let messages_uri = format!(
        "/api/v1/conversations/{}/messages",
        conversation["id"].as_str().expect("conversation id")
    );

    let (status, _) = send(
        &app,
        &ada,
        test::TestRequest::post()
            .uri(&messages_uri)
            .set_json(json!({"content": "Coffee at 10?"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, page) = send(&app, &grace, test::TestRequest::get().uri(&messages_uri)).await;
    assert_eq!(page["data"][0]["content"], "Coffee at 10?");
    assert!(reward_keys(&app, &ada).await.contains(&"first_message".to_owned()));

    let alan = login(&app, "alan").await;
    let (outsider, _) = send(&app, &alan, test::TestRequest::get().uri(&messages_uri)).await;
    assert_eq!(outsider, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn marking_read_clears_the_unread_count() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let alan = login(&app, "alan").await;
    send(
        &app,
        &alan,
        test::TestRequest::post()
            .uri("/api/v1/friends/requests")
            .set_json(json!({"userId": user_id("ada").to_string()})),
    )
    .await;

    let (_, inbox) = send(
        &app,
        &ada,
        test::TestRequest::get().uri("/api/v1/notifications?unreadOnly=true"),
    )
    .await;
    let notification = inbox
        .as_array()
        .and_then(|items| items.first())
        .expect("friend request notification");
    assert_eq!(notification["kind"], "friend_request");
    let read_uri = format!(
        "/api/v1/notifications/{}/read",
        notification["id"].as_str().expect("notification id")
    );

    for _ in 0..2 {
        let (status, body) = send(&app, &ada, test::TestRequest::post().uri(&read_uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["readAt"].is_string());
    }
    let (_, count) = send(
        &app,
        &ada,
        test::TestRequest::get().uri("/api/v1/notifications/unread-count"),
    )
    .await;
    assert_eq!(count["count"], 0);

    let (foreign, _) = send(&app, &alan, test::TestRequest::post().uri(&read_uri)).await;
    assert_eq!(foreign, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn push_tokens_register_and_unregister() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;
    let body = json!({"token": "ExponentPushToken[abc123]"});

    let (registered, _) = send(
        &app,
        &ada,
        test::TestRequest::put()
            .uri("/api/v1/push-tokens")
            .set_json(&body),
    )
    .await;
    let (removed, _) = send(
        &app,
        &ada,
        test::TestRequest::delete()
            .uri("/api/v1/push-tokens")
            .set_json(&body),
    )
    .await;
    let (malformed, _) = send(
        &app,
        &ada,
        test::TestRequest::put()
            .uri("/api/v1/push-tokens")
            .set_json(json!({"token": "not-a-token"})),
    )
    .await;
    assert_eq!(registered, StatusCode::NO_CONTENT);
    assert_eq!(removed, StatusCode::NO_CONTENT);
    assert_eq!(malformed, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn logout_ends_the_session() {
    let app = test::init_service(seeded_app().await).await;
    let ada = login(&app, "ada").await;

    let (status, me) = send(&app, &ada, test::TestRequest::get().uri("/api/v1/me")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["displayName"], "Ada Lovelace");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(ada)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("removal cookie")
        .into_owned();

    let (status, _) = send(&app, &cleared, test::TestRequest::get().uri("/api/v1/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn anonymous_requests_carry_a_trace_id() {
    let app = test::init_service(seeded_app().await).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/rewards").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
}

#[rstest]
#[case("/health/ready")]
#[case("/health/live")]
#[actix_web::test]
async fn probes_report_ok(#[case] uri: &str) {
    let app = test::init_service(seeded_app().await).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}
