//! Support group and therapist directory handlers.
//!
//! ```text
//! GET  /api/v1/support-groups
//! GET  /api/v1/support-groups/mine
//! POST /api/v1/support-groups/{id}/join
//! POST /api/v1/support-groups/{id}/leave
//! GET  /api/v1/therapists
//! GET  /api/v1/therapists/contact-requests
//! POST /api/v1/therapists/contact-requests {"therapistId":"...","message":"...","preferredContact":"email"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ContactRequest, PreferredContact, SupportGroup, Therapist};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{
    ContactRequestSchema, ErrorSchema, SupportGroupSchema, TherapistSchema,
};
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_label, parse_uuid};

/// Request body for `POST /api/v1/therapists/contact-requests`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestBody {
    #[schema(example = "a4d9e0b2-7c3f-4e8a-b1d2-5c6e7f8a9b01")]
    pub therapist_id: String,
    /// 1 to 2000 characters.
    pub message: String,
    /// email, phone or video.
    #[schema(example = "email")]
    pub preferred_contact: String,
}

/// Every support group with its current member count.
#[utoipa::path(
    get,
    path = "/api/v1/support-groups",
    responses(
        (status = 200, description = "Support groups", body = Envelope<Vec<SupportGroupSchema>>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "listSupportGroups"
)]
#[get("/support-groups")]
pub async fn list_support_groups(
    state: web::Data<HttpState>,
    _user: SessionUser,
) -> ApiResult<web::Json<Envelope<Vec<SupportGroup>>>> {
    Ok(Envelope::json(state.community.support_groups().await?))
}

/// Groups the signed-in user belongs to.
#[utoipa::path(
    get,
    path = "/api/v1/support-groups/mine",
    responses(
        (status = 200, description = "Joined groups", body = Envelope<Vec<SupportGroupSchema>>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "listMySupportGroups"
)]
#[get("/support-groups/mine")]
pub async fn my_support_groups(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<web::Json<Envelope<Vec<SupportGroup>>>> {
    Ok(Envelope::json(state.community.my_support_groups(&user_id).await?))
}

/// Join a support group.
#[utoipa::path(
    post,
    path = "/api/v1/support-groups/{id}/join",
    params(("id" = String, Path, description = "Support group identifier")),
    responses(
        (status = 200, description = "Joined", body = Envelope<SupportGroupSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown group", body = ErrorSchema),
        (status = 409, description = "Group full or already a member", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "joinSupportGroup"
)]
#[post("/support-groups/{id}/join")]
pub async fn join_support_group(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<SupportGroup>>> {
    let group_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    Ok(Envelope::json(state.community.join(&user_id, group_id).await?))
}

/// Leave a support group.
#[utoipa::path(
    post,
    path = "/api/v1/support-groups/{id}/leave",
    params(("id" = String, Path, description = "Support group identifier")),
    responses(
        (status = 200, description = "Left", body = Envelope<SupportGroupSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown group or not a member", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "leaveSupportGroup"
)]
#[post("/support-groups/{id}/leave")]
pub async fn leave_support_group(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Envelope<SupportGroup>>> {
    let group_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    Ok(Envelope::json(state.community.leave(&user_id, group_id).await?))
}

/// Therapist directory.
#[utoipa::path(
    get,
    path = "/api/v1/therapists",
    responses(
        (status = 200, description = "Therapists", body = Envelope<Vec<TherapistSchema>>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "listTherapists"
)]
#[get("/therapists")]
pub async fn list_therapists(
    state: web::Data<HttpState>,
    _user: SessionUser,
) -> ApiResult<web::Json<Envelope<Vec<Therapist>>>> {
    Ok(Envelope::json(state.community.therapists().await?))
}

/// Contact requests the signed-in user has sent.
#[utoipa::path(
    get,
    path = "/api/v1/therapists/contact-requests",
    responses(
        (status = 200, description = "Contact requests", body = Envelope<Vec<ContactRequestSchema>>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "listContactRequests"
)]
#[get("/therapists/contact-requests")]
pub async fn list_contact_requests(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<web::Json<Envelope<Vec<ContactRequest>>>> {
    Ok(Envelope::json(
        state.community.my_contact_requests(&user_id).await?,
    ))
}

/// Ask a therapist to get in touch.
#[utoipa::path(
    post,
    path = "/api/v1/therapists/contact-requests",
    request_body = ContactRequestBody,
    responses(
        (status = 201, description = "Request sent", body = Envelope<ContactRequestSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown therapist", body = ErrorSchema),
        (status = 409, description = "Therapist not accepting clients", body = ErrorSchema)
    ),
    tags = ["community"],
    operation_id = "createContactRequest"
)]
#[post("/therapists/contact-requests")]
pub async fn create_contact_request(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    payload: web::Json<ContactRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let therapist_id = parse_uuid(&body.therapist_id, FieldName::new("therapistId"))?;
    let preferred: PreferredContact =
        parse_label(&body.preferred_contact, FieldName::new("preferredContact"))?;
    let request = state
        .community
        .request_contact(&user_id, therapist_id, &body.message, preferred)
        .await?;
    Ok(HttpResponse::Created().json(Envelope { data: request }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::{starter_support_groups, starter_therapists};
    use crate::inbound::http::test_utils::{api_app, call_json, memory_state, signed_in};

    #[actix_web::test]
    async fn join_and_leave_update_membership() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "joiner@example.com").await;
        let group_id = starter_support_groups()[0].id;

        let (status, joined) = call_json(
            &app,
            test::TestRequest::post().uri(&format!("/api/v1/support-groups/{group_id}/join")),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(joined["data"]["memberCount"], 1);

        let (status, _) = call_json(
            &app,
            test::TestRequest::post().uri(&format!("/api/v1/support-groups/{group_id}/join")),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, mine) = call_json(
            &app,
            test::TestRequest::get().uri("/api/v1/support-groups/mine"),
            &cookie,
        )
        .await;
        assert_eq!(mine["data"].as_array().map(Vec::len), Some(1));

        let (status, left) = call_json(
            &app,
            test::TestRequest::post().uri(&format!("/api/v1/support-groups/{group_id}/leave")),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(left["data"]["memberCount"], 0);

        let (status, _) = call_json(
            &app,
            test::TestRequest::post().uri(&format!("/api/v1/support-groups/{group_id}/leave")),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(0, StatusCode::CREATED)]
    #[case(2, StatusCode::CONFLICT)]
    #[actix_web::test]
    async fn contact_requests_respect_availability(
        #[case] therapist: usize,
        #[case] expected: StatusCode,
    ) {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "seeker@example.com").await;
        let therapist_id = starter_therapists()[therapist].id;

        let (status, _) = call_json(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/therapists/contact-requests")
                .set_json(json!({
                    "therapistId": therapist_id,
                    "message": "Hello, I'd like to talk.",
                    "preferredContact": "video",
                })),
            &cookie,
        )
        .await;
        assert_eq!(status, expected);

        let (_, listed) = call_json(
            &app,
            test::TestRequest::get().uri("/api/v1/therapists/contact-requests"),
            &cookie,
        )
        .await;
        let expected_len = usize::from(expected == StatusCode::CREATED);
        assert_eq!(listed["data"].as_array().map(Vec::len), Some(expected_len));
    }

    #[actix_web::test]
    async fn unknown_therapist_is_not_found() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "lost@example.com").await;

        let (status, _) = call_json(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/therapists/contact-requests")
                .set_json(json!({
                    "therapistId": "00000000-0000-0000-0000-000000000000",
                    "message": "Anyone there?",
                    "preferredContact": "email",
                })),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
