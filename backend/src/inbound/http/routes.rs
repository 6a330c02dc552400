//! Route table for the `/api/v1` scope.
//!
//! Static paths such as `/goals/export` are registered ahead of their
//! parameterised siblings so a literal segment is never read as an id.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::Error;

use super::community::{
    create_contact_request, join_support_group, leave_support_group, list_contact_requests,
    list_support_groups, list_therapists, my_support_groups,
};
use super::goals::{create_goal, delete_goal, export_goals, list_goals, update_goal_progress};
use super::journal::{export_moods, list_insights, list_moods, log_mood, overview};
use super::privacy::{erase_data, export_data};
use super::settings::{
    get_notification_settings, get_privacy_settings, update_notification_settings,
    update_privacy_settings,
};
use super::users::{current_user, login, logout, register};

/// A route under `/api/v1` that requires a signed-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedRoute {
    /// Upper-case HTTP method.
    pub method: &'static str,
    /// Path relative to `/api/v1`, with ids filled in.
    pub path: &'static str,
}

const fn protected(method: &'static str, path: &'static str) -> ProtectedRoute {
    ProtectedRoute { method, path }
}

/// Every route that answers `401 Unauthorized` without a session.
pub const PROTECTED_ROUTES: &[ProtectedRoute] = &[
    protected("POST", "/logout"),
    protected("GET", "/me"),
    protected("GET", "/overview"),
    protected("GET", "/mood"),
    protected("POST", "/mood"),
    protected("GET", "/mood/export"),
    protected("GET", "/insights"),
    protected("GET", "/goals"),
    protected("POST", "/goals"),
    protected("GET", "/goals/export"),
    protected(
        "PUT",
        "/goals/00000000-0000-0000-0000-000000000000/progress",
    ),
    protected("DELETE", "/goals/00000000-0000-0000-0000-000000000000"),
    protected("GET", "/notifications/settings"),
    protected("PUT", "/notifications/settings"),
    protected("GET", "/privacy/settings"),
    protected("PUT", "/privacy/settings"),
    protected("GET", "/privacy/export"),
    protected("DELETE", "/privacy/data"),
    protected("GET", "/support-groups"),
    protected("GET", "/support-groups/mine"),
    protected(
        "POST",
        "/support-groups/00000000-0000-0000-0000-000000000000/join",
    ),
    protected(
        "POST",
        "/support-groups/00000000-0000-0000-0000-000000000000/leave",
    ),
    protected("GET", "/therapists"),
    protected("GET", "/therapists/contact-requests"),
    protected("POST", "/therapists/contact-requests"),
];

/// Largest accepted JSON body.
pub const JSON_BODY_LIMIT: usize = 64 * 1024;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("request body is not valid JSON for this endpoint")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("query string is invalid")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

/// Register every `/api/v1` handler on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use mindtrack::inbound::http::routes::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// # let _ = app;
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(json_error),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error))
    // accounts
    .service(register)
    .service(login)
    .service(logout)
    .service(current_user)
    // journal
    .service(overview)
    .service(export_moods)
    .service(list_moods)
    .service(log_mood)
    .service(list_insights)
    // goals
    .service(export_goals)
    .service(list_goals)
    .service(create_goal)
    .service(update_goal_progress)
    .service(delete_goal)
    // settings and privacy
    .service(get_notification_settings)
    .service(update_notification_settings)
    .service(get_privacy_settings)
    .service(update_privacy_settings)
    .service(export_data)
    .service(erase_data)
    // community
    .service(my_support_groups)
    .service(list_support_groups)
    .service(join_support_group)
    .service(leave_support_group)
    .service(list_contact_requests)
    .service(create_contact_request)
    .service(list_therapists);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    use super::super::test_utils::{api_app, call_json, memory_state, signed_in};

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let (state, _store) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "routes@example.com").await;

        let request = test::TestRequest::post()
            .uri("/api/v1/mood")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json");
        let (status, body) = call_json(&app, request, &cookie).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("code").and_then(Value::as_str), Some("invalid_request"));
    }

    #[actix_web::test]
    async fn export_path_is_not_treated_as_goal_id() {
        let (state, _store) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "export@example.com").await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/goals/export")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_route_is_not_found() {
        let (state, _store) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/nowhere").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
