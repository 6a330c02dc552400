//! Mood journal, insights and the dashboard overview.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use crate::domain::export::mood_entries_csv;
use crate::domain::ports::{
    InsightRepository, ListOptions, MoodEntryRepository, SortOrder, UserOverview,
    UserOverviewQuery,
};
use crate::domain::{Error, Insight, MoodEntry, NewMoodEntry, UserId};

/// Use-cases over a user's own journal rows.
#[derive(Clone)]
pub struct JournalService {
    moods: Arc<dyn MoodEntryRepository>,
    insights: Arc<dyn InsightRepository>,
    overview: Arc<dyn UserOverviewQuery>,
    clock: Arc<dyn Clock>,
}

impl JournalService {
    /// Create the service.
    pub fn new(
        moods: Arc<dyn MoodEntryRepository>,
        insights: Arc<dyn InsightRepository>,
        overview: Arc<dyn UserOverviewQuery>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            moods,
            insights,
            overview,
            clock,
        }
    }

    /// Log a mood for `user_id`.
    pub async fn log_mood(&self, user_id: &UserId, input: NewMoodEntry) -> Result<MoodEntry, Error> {
        let entry = input.into_entry(user_id.clone(), self.clock.utc());
        self.moods.insert(&entry).await?;
        debug!(user_id = %user_id, entry_id = %entry.id, "mood logged");
        Ok(entry)
    }

    /// Mood entries owned by `user_id`.
    pub async fn list_moods(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<MoodEntry>, Error> {
        Ok(self.moods.list_for_user(user_id, options).await?)
    }

    /// Every mood entry of `user_id` as CSV, oldest first.
    pub async fn export_moods_csv(&self, user_id: &UserId) -> Result<String, Error> {
        let entries = self
            .moods
            .list_for_user(
                user_id,
                ListOptions::default().with_order(SortOrder::OldestFirst),
            )
            .await?;
        Ok(mood_entries_csv(&entries))
    }

    /// Insights owned by `user_id`.
    pub async fn list_insights(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<Insight>, Error> {
        Ok(self.insights.list_for_user(user_id, options).await?)
    }

    /// The user together with all their journal rows.
    pub async fn overview(&self, user_id: &UserId) -> Result<UserOverview, Error> {
        self.overview
            .fetch(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MockInsightRepository, MockMoodEntryRepository, MockUserOverviewQuery, TenantDataError,
    };
    use chrono::{TimeZone, Utc};
    use mockable::MockClock;

    fn service(
        moods: MockMoodEntryRepository,
        overview: MockUserOverviewQuery,
        clock: MockClock,
    ) -> JournalService {
        JournalService::new(
            Arc::new(moods),
            Arc::new(MockInsightRepository::new()),
            Arc::new(overview),
            Arc::new(clock),
        )
    }

    #[tokio::test]
    async fn log_mood_stamps_clock_time_and_owner() {
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 21, 0, 0).single().expect("time");
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(now);
        let user = UserId::random();
        let owner = user.clone();
        let mut moods = MockMoodEntryRepository::new();
        moods
            .expect_insert()
            .withf(move |entry| entry.user_id == owner && entry.recorded_at == now)
            .times(1)
            .return_once(|_| Ok(()));

        let entry = service(moods, MockUserOverviewQuery::new(), clock)
            .log_mood(
                &user,
                NewMoodEntry::try_from_parts(7, Some("steady"), None).expect("valid"),
            )
            .await
            .expect("logged");
        assert_eq!(entry.score.value(), 7);
    }

    #[tokio::test]
    async fn export_requests_oldest_first() {
        let mut moods = MockMoodEntryRepository::new();
        moods
            .expect_list_for_user()
            .withf(|_, options| options.order == SortOrder::OldestFirst && options.limit.is_none())
            .return_once(|_, _| Ok(Vec::new()));

        let csv = service(moods, MockUserOverviewQuery::new(), MockClock::new())
            .export_moods_csv(&UserId::random())
            .await
            .expect("csv");
        assert_eq!(csv, "\u{feff}date,mood,notes\r\n");
    }

    #[tokio::test]
    async fn overview_of_missing_user_is_not_found() {
        let mut overview = MockUserOverviewQuery::new();
        overview.expect_fetch().return_once(|_| Ok(None));

        let err = service(MockMoodEntryRepository::new(), overview, MockClock::new())
            .overview(&UserId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn store_outage_maps_to_service_unavailable() {
        let mut moods = MockMoodEntryRepository::new();
        moods
            .expect_list_for_user()
            .return_once(|_, _| Err(TenantDataError::connection("pool timed out")));

        let err = service(moods, MockUserOverviewQuery::new(), MockClock::new())
            .list_moods(&UserId::random(), ListOptions::default())
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
