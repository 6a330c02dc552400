//! Mood journal, insights and overview handlers.
//!
//! ```text
//! GET  /api/v1/overview
//! GET  /api/v1/mood?limit=30
//! POST /api/v1/mood {"score":7,"notes":"walked the dog"}
//! GET  /api/v1/mood/export
//! GET  /api/v1/insights
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, GoalStatus, Insight, MoodEntry, MoodValidationError, NewMoodEntry, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Envelope, csv_attachment};
use crate::inbound::http::list_query::ListQuery;
use crate::inbound::http::schemas::{ErrorSchema, InsightSchema, MoodEntrySchema, UserSchema};
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, parse_optional_rfc3339_timestamp,
};

/// Request body for `POST /api/v1/mood`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogMoodRequest {
    /// Score from 1 to 10.
    #[schema(example = 7)]
    pub score: i64,
    /// Free text, up to 2000 characters.
    pub notes: Option<String>,
    /// RFC 3339 timestamp; defaults to now.
    pub recorded_at: Option<String>,
}

fn map_mood_error(err: &MoodValidationError) -> Error {
    let message = err.to_string();
    match err {
        MoodValidationError::ScoreOutOfRange { .. } => {
            field_error(FieldName::new("score"), ErrorCode::OutOfRange, message)
        }
        MoodValidationError::NoteTooLong { .. } => {
            field_error(FieldName::new("notes"), ErrorCode::TooLong, message)
        }
    }
}

impl TryFrom<LogMoodRequest> for NewMoodEntry {
    type Error = Error;

    fn try_from(value: LogMoodRequest) -> Result<Self, Self::Error> {
        let recorded_at = parse_optional_rfc3339_timestamp(
            value.recorded_at.as_deref(),
            FieldName::new("recordedAt"),
        )?;
        Self::try_from_parts(value.score, value.notes.as_deref(), recorded_at)
            .map_err(|err| map_mood_error(&err))
    }
}

/// Dashboard summary for the signed-in user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    #[schema(value_type = UserSchema)]
    pub user: User,
    pub mood_entry_count: usize,
    pub insight_count: usize,
    pub goal_count: usize,
    pub completed_goal_count: usize,
    /// Most recently recorded mood, if any.
    #[schema(value_type = Option<MoodEntrySchema>)]
    pub latest_mood: Option<MoodEntry>,
}

/// Counts and latest mood for the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/overview",
    responses(
        (status = 200, description = "Overview", body = Envelope<OverviewResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["journal"],
    operation_id = "getOverview"
)]
#[get("/overview")]
pub async fn overview(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<web::Json<Envelope<OverviewResponse>>> {
    let overview = state.journal.overview(&user_id).await?;
    let completed_goal_count = overview
        .goals
        .iter()
        .filter(|goal| goal.status == GoalStatus::Completed)
        .count();
    Ok(Envelope::json(OverviewResponse {
        mood_entry_count: overview.mood_entries.len(),
        insight_count: overview.insights.len(),
        goal_count: overview.goals.len(),
        completed_goal_count,
        latest_mood: overview.mood_entries.into_iter().next(),
        user: overview.user,
    }))
}

/// List the signed-in user's mood entries.
#[utoipa::path(
    get,
    path = "/api/v1/mood",
    params(ListQuery),
    responses(
        (status = 200, description = "Mood entries", body = Envelope<Vec<MoodEntrySchema>>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["journal"],
    operation_id = "listMoodEntries"
)]
#[get("/mood")]
pub async fn list_moods(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Envelope<Vec<MoodEntry>>>> {
    let options = query.into_inner().into_options()?;
    let entries = state.journal.list_moods(&user_id, options).await?;
    Ok(Envelope::json(entries))
}

/// Record a mood entry.
#[utoipa::path(
    post,
    path = "/api/v1/mood",
    request_body = LogMoodRequest,
    responses(
        (status = 201, description = "Mood logged", body = Envelope<MoodEntrySchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["journal"],
    operation_id = "logMood"
)]
#[post("/mood")]
pub async fn log_mood(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    payload: web::Json<LogMoodRequest>,
) -> ApiResult<HttpResponse> {
    let input = NewMoodEntry::try_from(payload.into_inner())?;
    let entry = state.journal.log_mood(&user_id, input).await?;
    Ok(HttpResponse::Created().json(Envelope { data: entry }))
}

/// Download every mood entry as CSV.
#[utoipa::path(
    get,
    path = "/api/v1/mood/export",
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["journal"],
    operation_id = "exportMoodEntries"
)]
#[get("/mood/export")]
pub async fn export_moods(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<HttpResponse> {
    let csv = state.journal.export_moods_csv(&user_id).await?;
    Ok(csv_attachment("mood-entries.csv", csv))
}

/// List the signed-in user's insights.
#[utoipa::path(
    get,
    path = "/api/v1/insights",
    params(ListQuery),
    responses(
        (status = 200, description = "Insights", body = Envelope<Vec<InsightSchema>>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["journal"],
    operation_id = "listInsights"
)]
#[get("/insights")]
pub async fn list_insights(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Envelope<Vec<Insight>>>> {
    let options = query.into_inner().into_options()?;
    let insights = state.journal.list_insights(&user_id, options).await?;
    Ok(Envelope::json(insights))
}
