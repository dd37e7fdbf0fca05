//! Friend request handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, FriendRequest, FriendSummary, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_uuid_error, parse_uuid};

/// Body for `POST /api/v1/friends/requests`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
}

/// Body for `POST /api/v1/friends/requests/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RespondBody {
    pub accept: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/friends/requests",
    request_body = SendFriendRequestBody,
    responses(
        (status = 201, description = "Request sent, or a reverse request accepted",
            body = FriendRequest),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Already pending or friends", body = Error)
    ),
    tags = ["friends"],
    operation_id = "sendFriendRequest"
)]
#[post("/friends/requests")]
pub async fn send_friend_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SendFriendRequestBody>,
) -> ApiResult<HttpResponse> {
    let sender_id = session.require_user_id()?;
    let raw = payload.into_inner().user_id;
    let receiver_id =
        UserId::new(&raw).map_err(|_| invalid_uuid_error(FieldName::new("userId"), &raw))?;
    let request = state.friends.send_request(&sender_id, &receiver_id).await?;
    Ok(HttpResponse::Created().json(request))
}

/// Accept or reject a pending request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/friends/requests/{id}",
    params(("id" = String, Path, description = "Friend request id")),
    request_body = RespondBody,
    responses(
        (status = 200, description = "Request answered", body = FriendRequest),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the receiver", body = Error),
        (status = 404, description = "Request not found", body = Error),
        (status = 409, description = "Request already answered or already friends", body = Error)
    ),
    tags = ["friends"],
    operation_id = "respondToFriendRequest"
)]
#[post("/friends/requests/{id}")]
pub async fn respond_to_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RespondBody>,
) -> ApiResult<web::Json<FriendRequest>> {
    let user_id = session.require_user_id()?;
    let request_id = parse_uuid(&path, FieldName::new("requestId"))?;
    let request = state
        .friends
        .respond(&user_id, request_id, payload.accept)
        .await?;
    Ok(web::Json(request))
}

/// Incoming pending requests.
#[utoipa::path(
    get,
    path = "/api/v1/friends/requests",
    responses(
        (status = 200, description = "Pending requests", body = [FriendRequest]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["friends"],
    operation_id = "listFriendRequests"
)]
#[get("/friends/requests")]
pub async fn list_pending_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let pending = state.friends_query.list_pending(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(pending))
}

#[utoipa::path(
    get,
    path = "/api/v1/friends",
    responses(
        (status = 200, description = "Accepted friends", body = [FriendSummary]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["friends"],
    operation_id = "listFriends"
)]
#[get("/friends")]
pub async fn list_friends(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let friends = state.friends_query.list_friends(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(friends))
}
