//! Shared harness for HTTP integration tests.
//!
//! Builds the production application over a seeded in-memory store and
//! offers small helpers for logging in and exchanging JSON.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use homecafe::domain::UserId;
use homecafe::domain::ports::{FIXTURE_ACCOUNTS, FIXTURE_PASSWORD, NoOpPushSender};
use homecafe::inbound::http::health::HealthState;
use homecafe::outbound::memory::InMemoryStore;
use homecafe::server::{AppDependencies, Repositories, build_app, build_http_state, seed_reference_data};

/// Build the full application over a fresh, seeded in-memory store.
pub async fn seeded_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
    seed_reference_data(&repos).await.expect("seed reference data");
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    build_app(AppDependencies {
        health_state,
        http_state: web::Data::new(build_http_state(&repos, Arc::new(NoOpPushSender))),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    })
}

/// Id of a demo account.
pub fn user_id(username: &str) -> UserId {
    let account = FIXTURE_ACCOUNTS
        .iter()
        .find(|account| account.username == username)
        .unwrap_or_else(|| panic!("{username} is a demo account"));
    UserId::from_uuid(account.user_id)
}

/// Log in as a demo account and return its session cookie.
pub async fn login<S, B>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": username, "password": FIXTURE_PASSWORD}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "login as {username}");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie issued")
        .into_owned()
}

/// Send `req` with `cookie` and return the status and JSON body.
///
/// Empty bodies decode to [`Value::Null`].
pub async fn send<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    req: test::TestRequest,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.cookie(cookie.clone()).to_request()).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

/// Make `a` and `b` friends through the API.
pub async fn befriend<S, B>(app: &S, a: &Cookie<'static>, b: &Cookie<'static>, b_id: &UserId)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, request) = send(
        app,
        a,
        test::TestRequest::post()
            .uri("/api/v1/friends/requests")
            .set_json(json!({"userId": b_id.to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = request["id"].as_str().expect("request id").to_owned();

    let (status, answered) = send(
        app,
        b,
        test::TestRequest::post()
            .uri(&format!("/api/v1/friends/requests/{request_id}"))
            .set_json(json!({"accept": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answered["status"], "accepted");
}

/// Keys of the caller's rewards.
pub async fn reward_keys<S, B>(app: &S, cookie: &Cookie<'static>) -> Vec<String>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(app, cookie, test::TestRequest::get().uri("/api/v1/rewards")).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .expect("reward list")
        .iter()
        .filter_map(|reward| reward["key"].as_str().map(str::to_owned))
        .collect()
}
