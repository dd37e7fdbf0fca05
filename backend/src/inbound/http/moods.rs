//! Mood journal handlers.
//!
//! ```text
//! PUT /api/v1/moods {"category":"calm","intensity":6,"note":"tea"}
//! GET /api/v1/moods?from=2026-03-01&to=2026-03-14
//! GET /api/v1/moods/2026-03-14
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{RecordMoodRequest, RecordMoodResponse};
use crate::domain::{Error, MoodCategory, MoodEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_date, parse_optional_date};

/// Body for `PUT /api/v1/moods`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMoodBody {
    /// Day the mood belongs to; defaults to today.
    #[schema(example = "2026-03-14")]
    pub date: Option<String>,
    pub category: MoodCategory,
    #[schema(minimum = 1, maximum = 10, example = 6)]
    pub intensity: u8,
    pub note: Option<String>,
}

/// Inclusive date range for `GET /api/v1/moods`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MoodRangeQuery {
    /// First day, `YYYY-MM-DD`.
    pub from: String,
    /// Last day, `YYYY-MM-DD`.
    pub to: String,
}

/// Record the caller's mood for a day, replacing any earlier entry.
#[utoipa::path(
    put,
    path = "/api/v1/moods",
    request_body = RecordMoodBody,
    responses(
        (status = 201, description = "Entry created", body = RecordMoodResponse),
        (status = 200, description = "Existing entry replaced", body = RecordMoodResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["moods"],
    operation_id = "recordMood"
)]
#[put("/moods")]
pub async fn record_mood(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecordMoodBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let body = payload.into_inner();
    let mood_date = parse_optional_date(body.date.as_deref(), FieldName::new("date"))?;
    let response = state
        .moods
        .record_mood(RecordMoodRequest {
            user_id,
            mood_date,
            category: body.category,
            intensity: body.intensity,
            note: body.note,
        })
        .await?;
    let mut builder = if response.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(builder.json(response))
}

/// The caller's entries in a date range, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/moods",
    params(MoodRangeQuery),
    responses(
        (status = 200, description = "Mood entries", body = [MoodEntry]),
        (status = 400, description = "Invalid range", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["moods"],
    operation_id = "listMoods"
)]
#[get("/moods")]
pub async fn list_moods(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MoodRangeQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let from = parse_date(&query.from, FieldName::new("from"))?;
    let to = parse_date(&query.to, FieldName::new("to"))?;
    let entries = state.moods_query.list_moods(&user_id, from, to).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(entries))
}

/// The caller's entry for one day.
#[utoipa::path(
    get,
    path = "/api/v1/moods/{date}",
    params(("date" = String, Path, description = "Day, `YYYY-MM-DD`")),
    responses(
        (status = 200, description = "Mood entry", body = MoodEntry),
        (status = 400, description = "Invalid date", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No entry for that day", body = Error)
    ),
    tags = ["moods"],
    operation_id = "moodForDate"
)]
#[get("/moods/{date}")]
pub async fn mood_for_date(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let mood_date = parse_date(&path, FieldName::new("date"))?;
    let entry = state.moods_query.mood_for_date(&user_id, mood_date).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(entry))
}
