//! Achievement catalogue and reward handlers.

use actix_web::{HttpResponse, get, web};

use crate::domain::Error;
use crate::domain::ports::{AchievementStatus, RewardSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Rewards the caller has earned, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/rewards",
    responses(
        (status = 200, description = "Rewards", body = [RewardSummary]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["rewards"],
    operation_id = "listRewards"
)]
#[get("/rewards")]
pub async fn list_rewards(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let rewards = state.rewards.list_rewards(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(rewards))
}

/// Every achievement, flagged with whether the caller has earned it.
#[utoipa::path(
    get,
    path = "/api/v1/rewards/achievements",
    responses(
        (status = 200, description = "Achievements", body = [AchievementStatus]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["rewards"],
    operation_id = "listAchievements"
)]
#[get("/rewards/achievements")]
pub async fn list_achievements(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let achievements = state.rewards.list_achievements(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(achievements))
}
