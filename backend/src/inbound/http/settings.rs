//! Notification and privacy settings handlers.
//!
//! ```text
//! GET /api/v1/notifications/settings
//! PUT /api/v1/notifications/settings {"moodReminders":true,"reminderTime":"20:00",...}
//! GET /api/v1/privacy/settings
//! PUT /api/v1/privacy/settings {"profileVisibility":"private",...}
//! ```
//!
//! `GET` returns defaults until the user first saves; `PUT` replaces the
//! whole settings record.

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, NotificationSettings, PrivacySettings, ProfileVisibility, ReminderTime, RetentionDays,
    SettingsValidationError, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{
    ErrorSchema, NotificationSettingsSchema, PrivacySettingsSchema,
};
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ErrorCode, FieldName, field_error, parse_label};

/// Request body for `PUT /api/v1/notifications/settings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsRequest {
    pub mood_reminders: bool,
    /// `HH:MM`, 24-hour clock.
    #[schema(example = "20:00")]
    pub reminder_time: String,
    pub goal_updates: bool,
    pub insight_alerts: bool,
    pub support_group_messages: bool,
    pub email_enabled: bool,
    pub push_enabled: bool,
}

/// Request body for `PUT /api/v1/privacy/settings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettingsRequest {
    /// private, therapist_only or community.
    #[schema(example = "therapist_only")]
    pub profile_visibility: String,
    pub share_mood_with_therapist: bool,
    pub anonymous_in_groups: bool,
    /// Between 30 and 3650 days.
    #[schema(example = 365)]
    pub data_retention_days: i32,
}

fn map_settings_error(err: &SettingsValidationError) -> Error {
    let message = err.to_string();
    match err {
        SettingsValidationError::InvalidReminderTime { .. } => {
            field_error(FieldName::new("reminderTime"), ErrorCode::InvalidFormat, message)
        }
        SettingsValidationError::RetentionOutOfRange { .. } => field_error(
            FieldName::new("dataRetentionDays"),
            ErrorCode::OutOfRange,
            message,
        ),
    }
}

impl NotificationSettingsRequest {
    fn into_settings(self, user_id: UserId) -> Result<NotificationSettings, Error> {
        Ok(NotificationSettings {
            user_id,
            mood_reminders: self.mood_reminders,
            reminder_time: ReminderTime::parse(&self.reminder_time)
                .map_err(|err| map_settings_error(&err))?,
            goal_updates: self.goal_updates,
            insight_alerts: self.insight_alerts,
            support_group_messages: self.support_group_messages,
            email_enabled: self.email_enabled,
            push_enabled: self.push_enabled,
        })
    }
}

impl PrivacySettingsRequest {
    fn into_settings(self, user_id: UserId) -> Result<PrivacySettings, Error> {
        Ok(PrivacySettings {
            user_id,
            profile_visibility: parse_label::<ProfileVisibility>(
                &self.profile_visibility,
                FieldName::new("profileVisibility"),
            )?,
            share_mood_with_therapist: self.share_mood_with_therapist,
            anonymous_in_groups: self.anonymous_in_groups,
            data_retention_days: RetentionDays::new(self.data_retention_days)
                .map_err(|err| map_settings_error(&err))?,
        })
    }
}

/// Current notification settings.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/settings",
    responses(
        (status = 200, description = "Notification settings", body = Envelope<NotificationSettingsSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "getNotificationSettings"
)]
#[get("/notifications/settings")]
pub async fn get_notification_settings(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<web::Json<Envelope<NotificationSettings>>> {
    Ok(Envelope::json(state.settings.notifications(&user_id).await?))
}

/// Replace notification settings.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/settings",
    request_body = NotificationSettingsRequest,
    responses(
        (status = 200, description = "Saved settings", body = Envelope<NotificationSettingsSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "updateNotificationSettings"
)]
#[put("/notifications/settings")]
pub async fn update_notification_settings(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    payload: web::Json<NotificationSettingsRequest>,
) -> ApiResult<web::Json<Envelope<NotificationSettings>>> {
    let settings = payload.into_inner().into_settings(user_id.clone())?;
    Ok(Envelope::json(
        state.settings.save_notifications(&user_id, settings).await?,
    ))
}

/// Current privacy settings.
#[utoipa::path(
    get,
    path = "/api/v1/privacy/settings",
    responses(
        (status = 200, description = "Privacy settings", body = Envelope<PrivacySettingsSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "getPrivacySettings"
)]
#[get("/privacy/settings")]
pub async fn get_privacy_settings(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<web::Json<Envelope<PrivacySettings>>> {
    Ok(Envelope::json(state.settings.privacy(&user_id).await?))
}

/// Replace privacy settings.
#[utoipa::path(
    put,
    path = "/api/v1/privacy/settings",
    request_body = PrivacySettingsRequest,
    responses(
        (status = 200, description = "Saved settings", body = Envelope<PrivacySettingsSchema>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "updatePrivacySettings"
)]
#[put("/privacy/settings")]
pub async fn update_privacy_settings(
    state: web::Data<HttpState>,
    SessionUser(user_id): SessionUser,
    payload: web::Json<PrivacySettingsRequest>,
) -> ApiResult<web::Json<Envelope<PrivacySettings>>> {
    let settings = payload.into_inner().into_settings(user_id.clone())?;
    Ok(Envelope::json(
        state.settings.save_privacy(&user_id, settings).await?,
    ))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{api_app, call_json, memory_state, signed_in};

    fn notification_body(reminder_time: &str) -> Value {
        json!({
            "moodReminders": false,
            "reminderTime": reminder_time,
            "goalUpdates": true,
            "insightAlerts": false,
            "supportGroupMessages": true,
            "emailEnabled": false,
            "pushEnabled": true,
        })
    }

    #[actix_web::test]
    async fn notification_settings_default_then_persist() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "notify@example.com").await;

        let (status, defaults) = call_json(
            &app,
            test::TestRequest::get().uri("/api/v1/notifications/settings"),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(defaults["data"]["reminderTime"].is_string());

        let (status, _) = call_json(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/notifications/settings")
                .set_json(notification_body("07:30")),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, saved) = call_json(
            &app,
            test::TestRequest::get().uri("/api/v1/notifications/settings"),
            &cookie,
        )
        .await;
        assert_eq!(saved["data"]["reminderTime"], "07:30");
        assert_eq!(saved["data"]["moodReminders"], false);
    }

    #[actix_web::test]
    async fn bad_reminder_time_is_rejected() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "bad-time@example.com").await;

        let (status, error) = call_json(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/notifications/settings")
                .set_json(notification_body("25:99")),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["details"]["field"], "reminderTime");
    }

    #[rstest]
    #[case("friends", 365, "profileVisibility")]
    #[case("private", 7, "dataRetentionDays")]
    #[actix_web::test]
    async fn invalid_privacy_settings_are_rejected(
        #[case] visibility: &str,
        #[case] retention: i32,
        #[case] field: &str,
    ) {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "privacy@example.com").await;

        let (status, error) = call_json(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/privacy/settings")
                .set_json(json!({
                    "profileVisibility": visibility,
                    "shareMoodWithTherapist": true,
                    "anonymousInGroups": true,
                    "dataRetentionDays": retention,
                })),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["details"]["field"], field);
    }

    #[actix_web::test]
    async fn privacy_settings_round_trip() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "visible@example.com").await;

        let (status, saved) = call_json(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/privacy/settings")
                .set_json(json!({
                    "profileVisibility": "community",
                    "shareMoodWithTherapist": true,
                    "anonymousInGroups": false,
                    "dataRetentionDays": 90,
                })),
            &cookie,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["data"]["profileVisibility"], "community");
        assert_eq!(saved["data"]["dataRetentionDays"], 90);
    }
}
