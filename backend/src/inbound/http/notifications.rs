//! Notification inbox handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Notification};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct NotificationListQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

/// Response body for `GET /api/v1/notifications/unread-count`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UnreadCount {
    pub count: u64,
}

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NotificationListQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let notifications = state
        .notifications_query
        .list_notifications(&user_id, query.unread_only)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(notifications))
}

/// Mark a notification read. Repeated calls keep the first read time.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification", body = Notification),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Notification not found", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Notification>> {
    let user_id = session.require_user_id()?;
    let notification_id = parse_uuid(&path, FieldName::new("notificationId"))?;
    let notification = state
        .notifications
        .mark_read(&user_id, notification_id)
        .await?;
    Ok(web::Json(notification))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread notifications", body = UnreadCount),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount"
)]
#[get("/notifications/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let count = state.notifications_query.unread_count(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(UnreadCount { count }))
}
