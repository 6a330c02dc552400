//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain values
//! revalidate every column and report failures as plain messages, which the
//! repositories wrap in their port's `Corrupt` or `Query` variant.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::UserAccount;
use crate::domain::{
    ContactRequest, DisplayName, Email, Goal, GoalProgress, Insight, MoodEntry, MoodNote,
    MoodScore, NotificationSettings, PasswordDigest, PrivacySettings, RetentionDays,
    SupportGroup, Therapist, User, UserId,
};

use super::schema::{
    contact_requests, goals, insights, mood_entries, notification_settings, privacy_settings,
    support_groups, therapists, users,
};

fn parse_label<T>(column: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err| format!("{column}: {err}"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        let email = Email::new(&self.email).map_err(|err| format!("email: {err}"))?;
        let display_name =
            DisplayName::new(&self.display_name).map_err(|err| format!("display_name: {err}"))?;
        Ok(User::new(UserId::from_uuid(self.id), email, display_name))
    }

    pub(crate) fn into_account(self) -> Result<UserAccount, String> {
        let password_digest = PasswordDigest::from_stored(self.password_hash.clone());
        Ok(UserAccount {
            user: self.into_user()?,
            password_digest,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
}

impl<'a> From<&'a UserAccount> for NewUserRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        Self {
            id: *account.user.id().as_uuid(),
            email: account.user.email().as_ref(),
            display_name: account.user.display_name().as_ref(),
            password_hash: account.password_digest.as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Journal tables
// ---------------------------------------------------------------------------

/// Mood journal row; doubles as the insert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable, Associations)]
#[diesel(table_name = mood_entries)]
#[diesel(belongs_to(UserRow, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MoodEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i16,
    pub notes: String,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&MoodEntry> for MoodEntryRow {
    fn from(entry: &MoodEntry) -> Self {
        Self {
            id: entry.id,
            user_id: *entry.user_id.as_uuid(),
            score: entry.score.value(),
            notes: entry.notes.as_ref().to_owned(),
            recorded_at: entry.recorded_at,
            created_at: entry.created_at,
        }
    }
}

impl MoodEntryRow {
    pub(crate) fn into_domain(self) -> Result<MoodEntry, String> {
        Ok(MoodEntry {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            score: MoodScore::new(i64::from(self.score)).map_err(|err| format!("score: {err}"))?,
            notes: MoodNote::new(&self.notes).map_err(|err| format!("notes: {err}"))?,
            recorded_at: self.recorded_at,
            created_at: self.created_at,
        })
    }
}

/// Insight row; doubles as the insert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable, Associations)]
#[diesel(table_name = insights)]
#[diesel(belongs_to(UserRow, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InsightRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub actionable: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Insight> for InsightRow {
    fn from(insight: &Insight) -> Self {
        Self {
            id: insight.id,
            user_id: *insight.user_id.as_uuid(),
            kind: insight.kind.as_str().to_owned(),
            title: insight.title.clone(),
            description: insight.description.clone(),
            priority: insight.priority.as_str().to_owned(),
            actionable: insight.actionable,
            created_at: insight.created_at,
        }
    }
}

impl InsightRow {
    pub(crate) fn into_domain(self) -> Result<Insight, String> {
        Ok(Insight {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            kind: parse_label("kind", &self.kind)?,
            title: self.title,
            description: self.description,
            priority: parse_label("priority", &self.priority)?,
            actionable: self.actionable,
            created_at: self.created_at,
        })
    }
}

/// Goal row; doubles as the insert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable, Associations)]
#[diesel(table_name = goals)]
#[diesel(belongs_to(UserRow, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GoalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub target_date: NaiveDate,
    pub progress: i16,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Goal> for GoalRow {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id,
            user_id: *goal.user_id.as_uuid(),
            title: goal.title.clone(),
            description: goal.description.clone(),
            category: goal.category.as_str().to_owned(),
            target_date: goal.target_date,
            progress: goal.progress.value(),
            status: goal.status.as_str().to_owned(),
            priority: goal.priority.as_str().to_owned(),
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

impl GoalRow {
    pub(crate) fn into_domain(self) -> Result<Goal, String> {
        Ok(Goal {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            title: self.title,
            description: self.description,
            category: parse_label("category", &self.category)?,
            target_date: self.target_date,
            progress: GoalProgress::new(i64::from(self.progress))
                .map_err(|err| format!("progress: {err}"))?,
            status: parse_label("status", &self.status)?,
            priority: parse_label("priority", &self.priority)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Changeset applied when goal progress moves.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = goals)]
pub(crate) struct GoalProgressUpdate<'a> {
    pub progress: i16,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Notification settings row; doubles as the upsert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = notification_settings, primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationSettingsRow {
    pub user_id: Uuid,
    pub mood_reminders: bool,
    pub reminder_time: NaiveTime,
    pub goal_updates: bool,
    pub insight_alerts: bool,
    pub support_group_messages: bool,
    pub email_enabled: bool,
    pub push_enabled: bool,
}

impl From<&NotificationSettings> for NotificationSettingsRow {
    fn from(settings: &NotificationSettings) -> Self {
        Self {
            user_id: *settings.user_id.as_uuid(),
            mood_reminders: settings.mood_reminders,
            reminder_time: settings.reminder_time.time(),
            goal_updates: settings.goal_updates,
            insight_alerts: settings.insight_alerts,
            support_group_messages: settings.support_group_messages,
            email_enabled: settings.email_enabled,
            push_enabled: settings.push_enabled,
        }
    }
}

impl From<NotificationSettingsRow> for NotificationSettings {
    fn from(row: NotificationSettingsRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            mood_reminders: row.mood_reminders,
            reminder_time: row.reminder_time.into(),
            goal_updates: row.goal_updates,
            insight_alerts: row.insight_alerts,
            support_group_messages: row.support_group_messages,
            email_enabled: row.email_enabled,
            push_enabled: row.push_enabled,
        }
    }
}

/// Privacy settings row; doubles as the upsert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = privacy_settings, primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PrivacySettingsRow {
    pub user_id: Uuid,
    pub profile_visibility: String,
    pub share_mood_with_therapist: bool,
    pub anonymous_in_groups: bool,
    pub data_retention_days: i32,
}

impl From<&PrivacySettings> for PrivacySettingsRow {
    fn from(settings: &PrivacySettings) -> Self {
        Self {
            user_id: *settings.user_id.as_uuid(),
            profile_visibility: settings.profile_visibility.as_str().to_owned(),
            share_mood_with_therapist: settings.share_mood_with_therapist,
            anonymous_in_groups: settings.anonymous_in_groups,
            data_retention_days: settings.data_retention_days.days(),
        }
    }
}

impl PrivacySettingsRow {
    pub(crate) fn into_domain(self) -> Result<PrivacySettings, String> {
        Ok(PrivacySettings {
            user_id: UserId::from_uuid(self.user_id),
            profile_visibility: parse_label("profile_visibility", &self.profile_visibility)?,
            share_mood_with_therapist: self.share_mood_with_therapist,
            anonymous_in_groups: self.anonymous_in_groups,
            data_retention_days: RetentionDays::new(self.data_retention_days)
                .map_err(|err| format!("data_retention_days: {err}"))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Community
// ---------------------------------------------------------------------------

/// Support group catalogue row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = support_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SupportGroupRow {
    pub id: Uuid,
    pub name: String,
    pub topic: String,
    pub description: String,
    pub capacity: i32,
}

impl SupportGroupRow {
    pub(crate) fn with_members(self, member_count: i64) -> SupportGroup {
        SupportGroup {
            id: self.id,
            name: self.name,
            topic: self.topic,
            description: self.description,
            capacity: self.capacity,
            member_count: i32::try_from(member_count).unwrap_or(i32::MAX),
        }
    }
}

/// Therapist directory row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = therapists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TherapistRow {
    pub id: Uuid,
    pub name: String,
    pub specialties: Vec<String>,
    pub accepting_clients: bool,
}

impl From<TherapistRow> for Therapist {
    fn from(row: TherapistRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            specialties: row.specialties,
            accepting_clients: row.accepting_clients,
        }
    }
}

/// Contact request row; doubles as the insert payload.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = contact_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactRequestRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub therapist_id: Uuid,
    pub message: String,
    pub preferred_contact: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ContactRequest> for ContactRequestRow {
    fn from(request: &ContactRequest) -> Self {
        Self {
            id: request.id,
            user_id: *request.user_id.as_uuid(),
            therapist_id: request.therapist_id,
            message: request.message.clone(),
            preferred_contact: request.preferred_contact.as_str().to_owned(),
            created_at: request.created_at,
        }
    }
}

impl ContactRequestRow {
    pub(crate) fn into_domain(self) -> Result<ContactRequest, String> {
        Ok(ContactRequest {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            therapist_id: self.therapist_id,
            message: self.message,
            preferred_contact: parse_label("preferred_contact", &self.preferred_contact)?,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Row mapping checks that need no database.
    use super::*;
    use crate::domain::{GoalCategory, NewGoal, NewMoodEntry, Priority};

    #[test]
    fn goal_rows_round_trip_labels() {
        let goal = NewGoal::try_from_parts(
            "Stretch",
            Some("Ten minutes"),
            GoalCategory::Physical,
            NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
            Priority::High,
        )
        .expect("goal")
        .into_goal(UserId::random(), Utc::now());

        let row = GoalRow::from(&goal);
        assert_eq!(row.category, "physical");
        assert_eq!(row.status, "not_started");
        assert_eq!(row.into_domain().expect("valid row"), goal);
    }

    #[test]
    fn unknown_labels_are_reported_as_corrupt_rows() {
        let entry = NewMoodEntry::try_from_parts(4, None, None)
            .expect("entry")
            .into_entry(UserId::random(), Utc::now());
        let mut insight = InsightRow {
            id: entry.id,
            user_id: *entry.user_id.as_uuid(),
            kind: "prophecy".to_owned(),
            title: "t".to_owned(),
            description: String::new(),
            priority: "low".to_owned(),
            actionable: false,
            created_at: entry.created_at,
        };
        let err = insight.clone().into_domain().expect_err("bad kind");
        assert!(err.starts_with("kind:"));

        insight.kind = "pattern".to_owned();
        insight.priority = "urgent".to_owned();
        let err = insight.into_domain().expect_err("bad priority");
        assert!(err.starts_with("priority:"));
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        let mut row = MoodEntryRow::from(
            &NewMoodEntry::try_from_parts(6, Some("fine"), None)
                .expect("entry")
                .into_entry(UserId::random(), Utc::now()),
        );
        row.score = 42;
        assert!(row.into_domain().is_err());
    }
}
