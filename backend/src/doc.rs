//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! schema wrappers from [`crate::inbound::http::schemas`] and the session
//! cookie security scheme. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for external tooling.

use crate::inbound::http::schemas::{
    ContactRequestSchema, DataExportSchema, ErrorCodeSchema, ErrorSchema, GoalSchema,
    InsightSchema, MoodEntrySchema, NotificationSettingsSchema, PrivacySettingsSchema,
    SupportGroupSchema, TherapistSchema, UserSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/register or /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "MindTrack API",
        description = "Session-authenticated mood journal, goals, settings and community \
                       endpoints. Every user-owned row is visible only to its owner.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::journal::overview,
        crate::inbound::http::journal::list_moods,
        crate::inbound::http::journal::log_mood,
        crate::inbound::http::journal::export_moods,
        crate::inbound::http::journal::list_insights,
        crate::inbound::http::goals::list_goals,
        crate::inbound::http::goals::create_goal,
        crate::inbound::http::goals::update_goal_progress,
        crate::inbound::http::goals::delete_goal,
        crate::inbound::http::goals::export_goals,
        crate::inbound::http::settings::get_notification_settings,
        crate::inbound::http::settings::update_notification_settings,
        crate::inbound::http::settings::get_privacy_settings,
        crate::inbound::http::settings::update_privacy_settings,
        crate::inbound::http::privacy::export_data,
        crate::inbound::http::privacy::erase_data,
        crate::inbound::http::community::list_support_groups,
        crate::inbound::http::community::my_support_groups,
        crate::inbound::http::community::join_support_group,
        crate::inbound::http::community::leave_support_group,
        crate::inbound::http::community::list_therapists,
        crate::inbound::http::community::list_contact_requests,
        crate::inbound::http::community::create_contact_request,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        MoodEntrySchema,
        InsightSchema,
        GoalSchema,
        NotificationSettingsSchema,
        PrivacySettingsSchema,
        SupportGroupSchema,
        TherapistSchema,
        ContactRequestSchema,
        DataExportSchema,
    )),
    tags(
        (name = "users", description = "Registration, login and the current account"),
        (name = "journal", description = "Mood entries, insights and the overview"),
        (name = "goals", description = "Personal goals and progress"),
        (name = "settings", description = "Notification and privacy preferences"),
        (name = "privacy", description = "Data export and erasure"),
        (name = "community", description = "Support groups and therapist contact"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
