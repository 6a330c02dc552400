//! Per-user notification and privacy settings.
//!
//! Both records fall back to defaults until the user saves them.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::UserId;
use super::labels::define_label_enum;

/// Shortest data retention period a user may choose.
pub const RETENTION_DAYS_MIN: i32 = 30;
/// Longest data retention period a user may choose.
pub const RETENTION_DAYS_MAX: i32 = 3650;

/// Validation errors for settings payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsValidationError {
    /// Reminder time was not `HH:MM`.
    #[error("reminder time must be HH:MM, got `{value}`")]
    InvalidReminderTime {
        /// Rejected input.
        value: String,
    },
    /// Retention outside the accepted bounds.
    #[error("data retention must be between {min} and {max} days")]
    RetentionOutOfRange {
        /// Lower bound.
        min: i32,
        /// Upper bound.
        max: i32,
    },
}

/// Daily reminder time, serialised as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(NaiveTime);

impl ReminderTime {
    /// Parse an `HH:MM` string.
    pub fn parse(value: &str) -> Result<Self, SettingsValidationError> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| SettingsValidationError::InvalidReminderTime {
                value: value.to_owned(),
            })
    }

    /// Underlying time of day.
    pub fn time(self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for ReminderTime {
    /// Stored times are truncated to the minute.
    fn from(time: NaiveTime) -> Self {
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = SettingsValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Owning user.
    pub user_id: UserId,
    /// Daily prompt to log a mood.
    pub mood_reminders: bool,
    /// Time of the daily prompt.
    pub reminder_time: ReminderTime,
    /// Goal progress nudges.
    pub goal_updates: bool,
    /// New insight alerts.
    pub insight_alerts: bool,
    /// Support group activity.
    pub support_group_messages: bool,
    /// Deliver by email.
    pub email_enabled: bool,
    /// Deliver by push notification.
    pub push_enabled: bool,
}

impl NotificationSettings {
    /// Settings used before the user saves their own.
    pub fn defaults_for(user_id: UserId) -> Self {
        Self {
            user_id,
            mood_reminders: true,
            reminder_time: ReminderTime::default(),
            goal_updates: true,
            insight_alerts: true,
            support_group_messages: false,
            email_enabled: true,
            push_enabled: false,
        }
    }
}

define_label_enum! {
    /// Who may see a user's profile.
    #[derive(Default)]
    ProfileVisibility ("profile visibility") {
        /// Only the user.
        #[default]
        Private => "private",
        /// The user and their therapist.
        TherapistOnly => "therapist_only",
        /// Support group members.
        Community => "community",
    }
}

/// Number of days journal data is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct RetentionDays(i32);

impl RetentionDays {
    /// Validate a retention period.
    pub fn new(days: i32) -> Result<Self, SettingsValidationError> {
        if !(RETENTION_DAYS_MIN..=RETENTION_DAYS_MAX).contains(&days) {
            return Err(SettingsValidationError::RetentionOutOfRange {
                min: RETENTION_DAYS_MIN,
                max: RETENTION_DAYS_MAX,
            });
        }
        Ok(Self(days))
    }

    /// Days value.
    pub fn days(self) -> i32 {
        self.0
    }
}

impl Default for RetentionDays {
    fn default() -> Self {
        Self(365)
    }
}

impl TryFrom<i32> for RetentionDays {
    type Error = SettingsValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RetentionDays> for i32 {
    fn from(value: RetentionDays) -> Self {
        value.0
    }
}

/// Privacy preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    /// Owning user.
    pub user_id: UserId,
    /// Profile audience.
    pub profile_visibility: ProfileVisibility,
    /// Share mood history with a therapist.
    pub share_mood_with_therapist: bool,
    /// Hide the display name inside support groups.
    pub anonymous_in_groups: bool,
    /// Retention period for journal data.
    pub data_retention_days: RetentionDays,
}

impl PrivacySettings {
    /// Settings used before the user saves their own.
    pub fn defaults_for(user_id: UserId) -> Self {
        Self {
            user_id,
            profile_visibility: ProfileVisibility::default(),
            share_mood_with_therapist: false,
            anonymous_in_groups: true,
            data_retention_days: RetentionDays::default(),
        }
    }
}
