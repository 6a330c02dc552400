//! Goal handlers.
//!
//! ```text
//! GET    /api/v1/goals
//! POST   /api/v1/goals {"title":"Meditate","category":"mindfulness","targetDate":"2024-12-31"}
//! PUT    /api/v1/goals/{id}/progress {"progress":40}
//! DELETE /api/v1/goals/{id}
//! GET    /api/v1/goals/export
//! ```
//!
//! Goals owned by another user answer `404`, exactly like missing ones.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, Goal, GoalCategory, GoalProgress, GoalValidationError, NewGoal, Priority,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Envelope, csv_attachment};
use crate::inbound::http::list_query::ListQuery;
use crate::inbound::http::schemas::{ErrorSchema, GoalSchema};
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, field_error, parse_date, parse_label, parse_uuid,
};

/// Request body for `POST /api/v1/goals`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    #[schema(example = "Meditate daily")]
    pub title: String,
    pub description: Option<String>,
    /// emotional, mindfulness, physical, sleep, social, professional or personal.
    #[schema(example = "mindfulness")]
    pub category: String,
    /// `YYYY-MM-DD`.
    #[schema(example = "2024-12-31")]
    pub target_date: String,
    /// low, medium (default) or high.
    pub priority: Option<String>,
}

/// Request body for `PUT /api/v1/goals/{id}/progress`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateProgressRequest {
    /// Percentage from 0 to 100.
    #[schema(example = 40)]
    pub progress: i64,
}

fn map_goal_error(err: &GoalValidationError) -> Error {
    let message = err.to_string();
    match err {
        GoalValidationError::EmptyTitle => {
            field_error(FieldName::new("title"), ErrorCode::Empty, message)
        }
        GoalValidationError::TitleTooLong { .. } => {
            field_error(FieldName::new("title"), ErrorCode::TooLong, message)
        }
        GoalValidationError::DescriptionTooLong { .. } => {
            field_error(FieldName::new("description"), ErrorCode::TooLong, message)
        }
        GoalValidationError::ProgressOutOfRange { .. } => {
            field_error(FieldName::new("progress"), ErrorCode::OutOfRange, message)
        }
    }
}

impl TryFrom<CreateGoalRequest> for NewGoal {
    type Error = Error;

    fn try_from(value: CreateGoalRequest) -> Result<Self, Self::Error> {
        let category: GoalCategory = parse_label(&value.category, FieldName::new("category"))?;
        let target_date = parse_date(&value.target_date, FieldName::new("targetDate"))?;
        let priority = value
            .priority
            .as_deref()
            .map(|raw| parse_label::<Priority>(raw, FieldName::new("priority")))
            .transpose()?
            .unwrap_or_default();
        Self::try_from_parts(
            &value.title,
            value.description.as_deref(),
            category,
            target_date,
            priority,
        )
        .map_err(|err| map_goal_error(&err))
    }
}

/// List the signed-in user's goals.
#[utoipa::path(
    get,
    path = "/api/v1/goals",
    params(ListQuery),
    responses(
        (status = 200, description = "Goals", body = Envelope<Vec<GoalSchema>>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "listGoals"
)]
#[get("/goals")]
pub async fn list_goals(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Envelope<Vec<Goal>>>> {
    let options = query.into_inner().into_options()?;
    Ok(Envelope::json(state.goals.list(&user_id, options).await?))
}

/// Create a goal.
#[utoipa::path(
    post,
    path = "/api/v1/goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = Envelope<GoalSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "createGoal"
)]
#[post("/goals")]
pub async fn create_goal(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    payload: web::Json<CreateGoalRequest>,
) -> ApiResult<HttpResponse> {
    let input = NewGoal::try_from(payload.into_inner())?;
    let goal = state.goals.create(&user_id, input).await?;
    Ok(HttpResponse::Created().json(Envelope { data: goal }))
}

/// Record progress on a goal.
#[utoipa::path(
    put,
    path = "/api/v1/goals/{id}/progress",
    params(("id" = String, Path, description = "Goal identifier")),
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Goal updated", body = Envelope<GoalSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Goal not found", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "updateGoalProgress"
)]
#[put("/goals/{id}/progress")]
pub async fn update_goal_progress(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    path: web::Path<String>,
    payload: web::Json<UpdateProgressRequest>,
) -> ApiResult<web::Json<Envelope<Goal>>> {
    let goal_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let progress = GoalProgress::new(payload.progress).map_err(|err| map_goal_error(&err))?;
    let goal = state
        .goals
        .update_progress(&user_id, goal_id, progress)
        .await?;
    Ok(Envelope::json(goal))
}

/// Delete a goal.
#[utoipa::path(
    delete,
    path = "/api/v1/goals/{id}",
    params(("id" = String, Path, description = "Goal identifier")),
    responses(
        (status = 204, description = "Goal deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Goal not found", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "deleteGoal"
)]
#[delete("/goals/{id}")]
pub async fn delete_goal(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let goal_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.goals.delete(&user_id, goal_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Download every goal as CSV.
#[utoipa::path(
    get,
    path = "/api/v1/goals/export",
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "exportGoals"
)]
#[get("/goals/export")]
pub async fn export_goals(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<HttpResponse> {
    let csv = state.goals.export_csv(&user_id).await?;
    Ok(csv_attachment("goals.csv", csv))
}
