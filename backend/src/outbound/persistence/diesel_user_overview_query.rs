//! Relation-loading read of a user with all their journal rows.
//!
//! The user row is loaded first; children are fetched with Diesel's
//! `belonging_to`, so a row can only appear under the user it references.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{TenantDataError, UserOverview, UserOverviewQuery};

use super::diesel_helpers::{collect_rows, map_diesel_error, map_pool_error};
use super::models::{GoalRow, InsightRow, MoodEntryRow, UserRow};
use super::pool::DbPool;
use super::schema::{goals, insights, mood_entries, users};

/// Diesel-backed `UserOverviewQuery`.
#[derive(Clone)]
pub struct DieselUserOverviewQuery {
    pool: DbPool,
}

impl DieselUserOverviewQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserOverviewQuery for DieselUserOverviewQuery {
    async fn fetch(&self, user_id: &UserId) -> Result<Option<UserOverview>, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(user_row) = users::table
            .find(*user_id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let moods: Vec<MoodEntryRow> = MoodEntryRow::belonging_to(&user_row)
            .select(MoodEntryRow::as_select())
            .order((mood_entries::recorded_at.desc(), mood_entries::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let insight_rows: Vec<InsightRow> = InsightRow::belonging_to(&user_row)
            .select(InsightRow::as_select())
            .order((insights::created_at.desc(), insights::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let goal_rows: Vec<GoalRow> = GoalRow::belonging_to(&user_row)
            .select(GoalRow::as_select())
            .order((goals::created_at.desc(), goals::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Some(UserOverview {
            user: user_row.into_user().map_err(TenantDataError::corrupt)?,
            mood_entries: collect_rows(
                moods.into_iter().map(MoodEntryRow::into_domain),
                TenantDataError::corrupt,
            )?,
            insights: collect_rows(
                insight_rows.into_iter().map(InsightRow::into_domain),
                TenantDataError::corrupt,
            )?,
            goals: collect_rows(
                goal_rows.into_iter().map(GoalRow::into_domain),
                TenantDataError::corrupt,
            )?,
        }))
    }
}
