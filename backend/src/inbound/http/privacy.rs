//! Personal data export and erasure.
//!
//! ```text
//! GET    /api/v1/privacy/export
//! DELETE /api/v1/privacy/data
//! ```

use actix_web::{HttpResponse, delete, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::PurgeSummary;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_store_header;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{DataExportSchema, ErrorSchema};
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;

/// Rows removed by `DELETE /api/v1/privacy/data`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErasureResponse {
    pub mood_entries: u64,
    pub insights: u64,
    pub goals: u64,
}

impl From<PurgeSummary> for ErasureResponse {
    fn from(summary: PurgeSummary) -> Self {
        Self {
            mood_entries: summary.mood_entries,
            insights: summary.insights,
            goals: summary.goals,
        }
    }
}

/// Download everything stored about the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/privacy/export",
    responses(
        (status = 200, description = "Data bundle", body = Envelope<DataExportSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["privacy"],
    operation_id = "exportPersonalData"
)]
#[get("/privacy/export")]
pub async fn export_data(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<HttpResponse> {
    let export = state.privacy.export(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(Envelope { data: export }))
}

/// Delete the signed-in user's mood entries, insights and goals.
///
/// The account itself is kept, so repeating the call returns zero counts.
#[utoipa::path(
    delete,
    path = "/api/v1/privacy/data",
    responses(
        (status = 200, description = "Rows deleted", body = Envelope<ErasureResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["privacy"],
    operation_id = "erasePersonalData"
)]
#[delete("/privacy/data")]
pub async fn erase_data(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<web::Json<Envelope<ErasureResponse>>> {
    let summary = state.privacy.erase_journal(&user_id).await?;
    Ok(Envelope::json(summary.into()))
}
