//! Data export and erasure for a single user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use tracing::info;

use crate::domain::ports::{PurgeScope, PurgeSummary, TenantDataRepository, UserOverviewQuery};
use crate::domain::{
    Error, Goal, Insight, MoodEntry, NotificationSettings, PrivacySettings, SettingsService, User,
    UserId,
};

/// Everything the backend stores about one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    /// When the bundle was assembled.
    pub exported_at: DateTime<Utc>,
    /// Account profile.
    pub profile: User,
    /// Mood journal.
    pub mood_entries: Vec<MoodEntry>,
    /// Stored insights.
    pub insights: Vec<Insight>,
    /// Goals.
    pub goals: Vec<Goal>,
    /// Notification settings (defaults when unsaved).
    pub notification_settings: NotificationSettings,
    /// Privacy settings (defaults when unsaved).
    pub privacy_settings: PrivacySettings,
}

/// Export and erase a user's own data.
#[derive(Clone)]
pub struct PrivacyService {
    overview: Arc<dyn UserOverviewQuery>,
    tenant_data: Arc<dyn TenantDataRepository>,
    settings: SettingsService,
    clock: Arc<dyn Clock>,
}

impl PrivacyService {
    /// Create the service.
    pub fn new(
        overview: Arc<dyn UserOverviewQuery>,
        tenant_data: Arc<dyn TenantDataRepository>,
        settings: SettingsService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            overview,
            tenant_data,
            settings,
            clock,
        }
    }

    /// Assemble the user's data bundle.
    pub async fn export(&self, user_id: &UserId) -> Result<DataExport, Error> {
        let overview = self
            .overview
            .fetch(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let notification_settings = self.settings.notifications(user_id).await?;
        let privacy_settings = self.settings.privacy(user_id).await?;
        Ok(DataExport {
            exported_at: self.clock.utc(),
            profile: overview.user,
            mood_entries: overview.mood_entries,
            insights: overview.insights,
            goals: overview.goals,
            notification_settings,
            privacy_settings,
        })
    }

    /// Delete the user's mood entries, insights and goals; the account stays.
    pub async fn erase_journal(&self, user_id: &UserId) -> Result<PurgeSummary, Error> {
        let summary = self
            .tenant_data
            .purge(std::slice::from_ref(user_id), PurgeScope::JournalOnly)
            .await?;
        info!(
            user_id = %user_id,
            mood_entries = summary.mood_entries,
            insights = summary.insights,
            goals = summary.goals,
            "journal data erased"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MockNotificationSettingsRepository, MockPrivacySettingsRepository,
        MockTenantDataRepository, MockUserOverviewQuery, UserOverview,
    };
    use mockable::MockClock;

    fn settings_without_saved_rows() -> SettingsService {
        let mut notifications = MockNotificationSettingsRepository::new();
        notifications.expect_find().returning(|_| Ok(None));
        let mut privacy = MockPrivacySettingsRepository::new();
        privacy.expect_find().returning(|_| Ok(None));
        SettingsService::new(Arc::new(notifications), Arc::new(privacy))
    }

    #[tokio::test]
    async fn export_bundles_profile_rows_and_settings() {
        let user = User::try_from_strings(
            "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "noa@example.com",
            "Noa",
        )
        .expect("user");
        let profile = user.clone();
        let mut overview = MockUserOverviewQuery::new();
        overview.expect_fetch().return_once(move |_| {
            Ok(Some(UserOverview {
                user: profile,
                mood_entries: Vec::new(),
                insights: Vec::new(),
                goals: Vec::new(),
            }))
        });
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(Utc::now());
        let service = PrivacyService::new(
            Arc::new(overview),
            Arc::new(MockTenantDataRepository::new()),
            settings_without_saved_rows(),
            Arc::new(clock),
        );

        let export = service.export(user.id()).await.expect("export");
        assert_eq!(export.profile, user);
        let json = serde_json::to_value(&export).expect("serialise");
        assert_eq!(json["privacySettings"]["profileVisibility"], "private");
        assert!(json["moodEntries"].as_array().is_some_and(Vec::is_empty));
    }

    #[tokio::test]
    async fn erase_purges_only_journal_rows_of_the_caller() {
        let user = UserId::random();
        let expected = user.clone();
        let mut tenant_data = MockTenantDataRepository::new();
        tenant_data
            .expect_purge()
            .withf(move |users, scope| {
                users.len() == 1 && users[0] == expected && *scope == PurgeScope::JournalOnly
            })
            .times(1)
            .return_once(|_, _| {
                Ok(PurgeSummary {
                    mood_entries: 3,
                    insights: 1,
                    goals: 2,
                    users: 0,
                })
            });
        let service = PrivacyService::new(
            Arc::new(MockUserOverviewQuery::new()),
            Arc::new(tenant_data),
            settings_without_saved_rows(),
            Arc::new(MockClock::new()),
        );

        let summary = service.erase_journal(&user).await.expect("erased");
        assert_eq!(summary.total(), 6);
    }

    #[tokio::test]
    async fn export_for_deleted_account_is_not_found() {
        let mut overview = MockUserOverviewQuery::new();
        overview.expect_fetch().return_once(|_| Ok(None));
        let service = PrivacyService::new(
            Arc::new(overview),
            Arc::new(MockTenantDataRepository::new()),
            settings_without_saved_rows(),
            Arc::new(MockClock::new()),
        );

        let err = service
            .export(&UserId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
