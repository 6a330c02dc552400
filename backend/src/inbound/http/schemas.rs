//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON shape of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "mood score must be between 1 and 10, got 11")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "4f1f0a2e-7f39-4c55-9d2f-1c0c6e8b1a77")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "alice@example.com")]
    email: String,
    #[schema(example = "Alice")]
    display_name: String,
}

/// OpenAPI schema for [`crate::domain::MoodEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::MoodEntry, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MoodEntrySchema {
    id: uuid::Uuid,
    user_id: String,
    /// Score from 1 to 10.
    #[schema(minimum = 1, maximum = 10, example = 7)]
    score: i16,
    notes: String,
    recorded_at: chrono::DateTime<chrono::Utc>,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::Insight`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Insight, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct InsightSchema {
    id: uuid::Uuid,
    user_id: String,
    /// recommendation, pattern, warning, celebration or milestone.
    #[schema(rename = "type", example = "pattern")]
    kind: String,
    title: String,
    description: String,
    #[schema(example = "medium")]
    priority: String,
    actionable: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::Goal`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Goal, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct GoalSchema {
    id: uuid::Uuid,
    user_id: String,
    title: String,
    description: String,
    #[schema(example = "mindfulness")]
    category: String,
    target_date: chrono::NaiveDate,
    #[schema(minimum = 0, maximum = 100)]
    progress: i16,
    /// not_started, in_progress, completed or overdue.
    #[schema(example = "in_progress")]
    status: String,
    #[schema(example = "high")]
    priority: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::NotificationSettings`].
#[derive(ToSchema)]
#[schema(as = crate::domain::NotificationSettings, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct NotificationSettingsSchema {
    user_id: String,
    mood_reminders: bool,
    #[schema(example = "20:00")]
    reminder_time: String,
    goal_updates: bool,
    insight_alerts: bool,
    support_group_messages: bool,
    email_enabled: bool,
    push_enabled: bool,
}

/// OpenAPI schema for [`crate::domain::PrivacySettings`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PrivacySettings, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PrivacySettingsSchema {
    user_id: String,
    /// private, therapist_only or community.
    #[schema(example = "private")]
    profile_visibility: String,
    share_mood_with_therapist: bool,
    anonymous_in_groups: bool,
    #[schema(minimum = 30, maximum = 3650, example = 365)]
    data_retention_days: i32,
}

/// OpenAPI schema for [`crate::domain::SupportGroup`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SupportGroup, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SupportGroupSchema {
    id: uuid::Uuid,
    name: String,
    topic: String,
    description: String,
    capacity: i32,
    member_count: i32,
}

/// OpenAPI schema for [`crate::domain::Therapist`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Therapist, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct TherapistSchema {
    id: uuid::Uuid,
    name: String,
    specialties: Vec<String>,
    accepting_clients: bool,
}

/// OpenAPI schema for [`crate::domain::ContactRequest`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ContactRequest, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ContactRequestSchema {
    id: uuid::Uuid,
    user_id: String,
    therapist_id: uuid::Uuid,
    message: String,
    /// email, phone or video.
    #[schema(example = "email")]
    preferred_contact: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::DataExport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DataExport, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DataExportSchema {
    exported_at: chrono::DateTime<chrono::Utc>,
    profile: UserSchema,
    mood_entries: Vec<MoodEntrySchema>,
    insights: Vec<InsightSchema>,
    goals: Vec<GoalSchema>,
    notification_settings: NotificationSettingsSchema,
    privacy_settings: PrivacySettingsSchema,
}
