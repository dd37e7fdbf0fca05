//! Device push token registration.

use actix_web::{HttpResponse, delete, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for both push token endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PushTokenBody {
    #[schema(example = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]")]
    pub token: String,
}

/// Register the device token for the caller, taking it over from any
/// previous owner.
#[utoipa::path(
    put,
    path = "/api/v1/push-tokens",
    request_body = PushTokenBody,
    responses(
        (status = 204, description = "Token registered"),
        (status = 400, description = "Malformed token", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["push"],
    operation_id = "registerPushToken"
)]
#[put("/push-tokens")]
pub async fn register_push_token(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PushTokenBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state
        .push_tokens
        .register_token(&user_id, payload.into_inner().token)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/v1/push-tokens",
    request_body = PushTokenBody,
    responses(
        (status = 204, description = "Token forgotten"),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["push"],
    operation_id = "unregisterPushToken"
)]
#[delete("/push-tokens")]
pub async fn unregister_push_token(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PushTokenBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state
        .push_tokens
        .unregister_token(&user_id, payload.into_inner().token)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
