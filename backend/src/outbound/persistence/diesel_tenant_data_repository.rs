//! Atomic bulk seed and purge over every per-user table.
//!
//! Both operations run in one transaction. Purge deletes dependants before
//! parents because the foreign keys do not cascade.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::info;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{
    PurgeScope, PurgeSummary, TenantDataError, TenantDataRepository, TenantSeed,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error, to_count};
use super::models::{GoalRow, InsightRow, MoodEntryRow, NewUserRow};
use super::pool::DbPool;
use super::schema::{
    contact_requests, goals, insights, mood_entries, notification_settings, privacy_settings,
    support_group_members, users,
};

/// Diesel-backed `TenantDataRepository`.
#[derive(Clone)]
pub struct DieselTenantDataRepository {
    pool: DbPool,
}

impl DieselTenantDataRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn purge_rows(
    conn: &mut AsyncPgConnection,
    owners: &[Uuid],
    scope: PurgeScope,
) -> Result<PurgeSummary, diesel::result::Error> {
    let mut summary = PurgeSummary::default();
    if scope == PurgeScope::Everything {
        diesel::delete(contact_requests::table.filter(contact_requests::user_id.eq_any(owners)))
            .execute(conn)
            .await?;
        diesel::delete(
            support_group_members::table.filter(support_group_members::user_id.eq_any(owners)),
        )
        .execute(conn)
        .await?;
        diesel::delete(
            notification_settings::table.filter(notification_settings::user_id.eq_any(owners)),
        )
        .execute(conn)
        .await?;
        diesel::delete(privacy_settings::table.filter(privacy_settings::user_id.eq_any(owners)))
            .execute(conn)
            .await?;
    }
    summary.mood_entries = to_count(
        diesel::delete(mood_entries::table.filter(mood_entries::user_id.eq_any(owners)))
            .execute(conn)
            .await?,
    );
    summary.insights = to_count(
        diesel::delete(insights::table.filter(insights::user_id.eq_any(owners)))
            .execute(conn)
            .await?,
    );
    summary.goals = to_count(
        diesel::delete(goals::table.filter(goals::user_id.eq_any(owners)))
            .execute(conn)
            .await?,
    );
    if scope == PurgeScope::Everything {
        summary.users = to_count(
            diesel::delete(users::table.filter(users::id.eq_any(owners)))
                .execute(conn)
                .await?,
        );
    }
    Ok(summary)
}

#[async_trait]
impl TenantDataRepository for DieselTenantDataRepository {
    async fn seed(&self, seed: &TenantSeed) -> Result<(), TenantDataError> {
        let new_users: Vec<NewUserRow<'_>> = seed.users.iter().map(NewUserRow::from).collect();
        let moods: Vec<MoodEntryRow> = seed.mood_entries.iter().map(MoodEntryRow::from).collect();
        let insight_rows: Vec<InsightRow> = seed.insights.iter().map(InsightRow::from).collect();
        let goal_rows: Vec<GoalRow> = seed.goals.iter().map(GoalRow::from).collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                if !new_users.is_empty() {
                    diesel::insert_into(users::table)
                        .values(&new_users)
                        .execute(conn)
                        .await?;
                }
                if !moods.is_empty() {
                    diesel::insert_into(mood_entries::table)
                        .values(&moods)
                        .execute(conn)
                        .await?;
                }
                if !insight_rows.is_empty() {
                    diesel::insert_into(insights::table)
                        .values(&insight_rows)
                        .execute(conn)
                        .await?;
                }
                if !goal_rows.is_empty() {
                    diesel::insert_into(goals::table)
                        .values(&goal_rows)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?;

        info!(
            users = seed.users.len(),
            mood_entries = seed.mood_entries.len(),
            insights = seed.insights.len(),
            goals = seed.goals.len(),
            "tenant rows seeded"
        );
        Ok(())
    }

    async fn purge(
        &self,
        users: &[UserId],
        scope: PurgeScope,
    ) -> Result<PurgeSummary, TenantDataError> {
        let owners: Vec<Uuid> = users.iter().map(|id| *id.as_uuid()).collect();
        if owners.is_empty() {
            return Ok(PurgeSummary::default());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let summary = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move { purge_rows(conn, &owners, scope).await }.scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        info!(
            users = users.len(),
            deleted = summary.total(),
            ?scope,
            "tenant rows purged"
        );
        Ok(summary)
    }
}
