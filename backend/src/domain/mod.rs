//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed entities for the mood journal, insights,
//! goals, settings and community features, plus the services that drive
//! them through the ports in [`ports`]. Types validate on construction and
//! document their serde contracts in Rustdoc.
//!
//! Public surface:
//! - Error, ErrorCode: API error payload and stable identifier.
//! - User, UserId: account identity. Every tenant row carries a `UserId`.
//! - MoodEntry, Insight, Goal: the per-user journal tables.
//! - *Service: use-cases consumed by the HTTP adapter.
//! - TenantIsolationAudit: cross-tenant leak detection over the ports.

mod account_service;
mod auth;
mod community;
mod community_service;
pub mod error;
pub mod export;
mod goal;
mod goal_service;
mod insight;
mod journal_service;
mod labels;
mod mood;
pub mod ports;
mod privacy_service;
mod settings;
mod settings_service;
pub mod tenant_isolation;
mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN, PasswordDigest,
    PasswordHashError, Registration,
};
pub use self::community::{
    CONTACT_MESSAGE_MAX, ContactRequest, ContactRequestValidationError, PreferredContact,
    SupportGroup, Therapist, starter_support_groups, starter_therapists,
};
pub use self::community_service::CommunityService;
pub use self::error::{Error, ErrorCode};
pub use self::goal::{
    GOAL_DESCRIPTION_MAX, GOAL_TITLE_MAX, Goal, GoalCategory, GoalProgress, GoalStatus,
    GoalValidationError, NewGoal,
};
pub use self::goal_service::GoalService;
pub use self::insight::{
    INSIGHT_DESCRIPTION_MAX, INSIGHT_TITLE_MAX, Insight, InsightKind, InsightValidationError,
};
pub use self::journal_service::JournalService;
pub use self::labels::{Priority, UnknownLabelError};
pub use self::mood::{
    MOOD_NOTE_MAX, MOOD_SCORE_MAX, MOOD_SCORE_MIN, MoodEntry, MoodNote, MoodScore,
    MoodValidationError, NewMoodEntry,
};
pub use self::privacy_service::{DataExport, PrivacyService};
pub use self::settings::{
    NotificationSettings, PrivacySettings, ProfileVisibility, RETENTION_DAYS_MAX,
    RETENTION_DAYS_MIN, ReminderTime, RetentionDays, SettingsValidationError,
};
pub use self::settings_service::SettingsService;
pub use self::tenant_isolation::{
    AuditPorts, AuditReport, CheckName, CheckResult, FixtureError, TenantFixture, TenantTable,
    TenantIsolationAudit, Violation,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DisplayName, Email, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use mindtrack::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
