//! PostgreSQL adapters for the per-user journal tables.
//!
//! Every read filters on `user_id` before ordering or limiting. Ties on the
//! timestamp are broken by row id so paging is stable.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    GoalRepository, InsightRepository, ListOptions, MoodEntryRepository, SortOrder,
    TenantDataError,
};
use crate::domain::{Goal, Insight, MoodEntry, UserId};

use super::diesel_helpers::{
    collect_rows, from_sql_count, map_diesel_error, map_pool_error, to_count,
};
use super::models::{GoalProgressUpdate, GoalRow, InsightRow, MoodEntryRow};
use super::pool::DbPool;
use super::schema::{goals, insights, mood_entries};

/// Diesel-backed `MoodEntryRepository`.
#[derive(Clone)]
pub struct DieselMoodEntryRepository {
    pool: DbPool,
}

impl DieselMoodEntryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MoodEntryRepository for DieselMoodEntryRepository {
    async fn insert(&self, entry: &MoodEntry) -> Result<(), TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(mood_entries::table)
            .values(MoodEntryRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<MoodEntry>, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = mood_entries::table
            .filter(mood_entries::user_id.eq(*user_id.as_uuid()))
            .select(MoodEntryRow::as_select())
            .into_boxed();
        query = match options.order {
            SortOrder::NewestFirst => {
                query.order((mood_entries::recorded_at.desc(), mood_entries::id.desc()))
            }
            SortOrder::OldestFirst => {
                query.order((mood_entries::recorded_at.asc(), mood_entries::id.asc()))
            }
        };
        if let Some(limit) = options.limit {
            query = query.limit(i64::from(limit));
        }
        let rows: Vec<MoodEntryRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(MoodEntryRow::into_domain), TenantDataError::corrupt)
    }

    async fn count_all(&self) -> Result<u64, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        mood_entries::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(from_sql_count)
            .map_err(map_diesel_error)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(mood_entries::table.filter(mood_entries::user_id.eq(*user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(to_count)
            .map_err(map_diesel_error)
    }
}

/// Diesel-backed `InsightRepository`.
#[derive(Clone)]
pub struct DieselInsightRepository {
    pool: DbPool,
}

impl DieselInsightRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InsightRepository for DieselInsightRepository {
    async fn insert(&self, insight: &Insight) -> Result<(), TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(insights::table)
            .values(InsightRow::from(insight))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<Insight>, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = insights::table
            .filter(insights::user_id.eq(*user_id.as_uuid()))
            .select(InsightRow::as_select())
            .into_boxed();
        query = match options.order {
            SortOrder::NewestFirst => query.order((insights::created_at.desc(), insights::id.desc())),
            SortOrder::OldestFirst => query.order((insights::created_at.asc(), insights::id.asc())),
        };
        if let Some(limit) = options.limit {
            query = query.limit(i64::from(limit));
        }
        let rows: Vec<InsightRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(InsightRow::into_domain), TenantDataError::corrupt)
    }

    async fn count_all(&self) -> Result<u64, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        insights::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(from_sql_count)
            .map_err(map_diesel_error)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(insights::table.filter(insights::user_id.eq(*user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(to_count)
            .map_err(map_diesel_error)
    }
}

/// Diesel-backed `GoalRepository`.
#[derive(Clone)]
pub struct DieselGoalRepository {
    pool: DbPool,
}

impl DieselGoalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepository for DieselGoalRepository {
    async fn insert(&self, goal: &Goal) -> Result<(), TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(goals::table)
            .values(GoalRow::from(goal))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, user_id: &UserId, goal_id: Uuid) -> Result<Option<Goal>, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = goals::table
            .filter(goals::id.eq(goal_id))
            .filter(goals::user_id.eq(*user_id.as_uuid()))
            .select(GoalRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(GoalRow::into_domain)
            .transpose()
            .map_err(TenantDataError::corrupt)
    }

    async fn update(&self, goal: &Goal) -> Result<bool, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = GoalProgressUpdate {
            progress: goal.progress.value(),
            status: goal.status.as_str(),
            updated_at: goal.updated_at,
        };
        let updated = diesel::update(
            goals::table
                .filter(goals::id.eq(goal.id))
                .filter(goals::user_id.eq(*goal.user_id.as_uuid())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, user_id: &UserId, goal_id: Uuid) -> Result<bool, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            goals::table
                .filter(goals::id.eq(goal_id))
                .filter(goals::user_id.eq(*user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<Goal>, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = goals::table
            .filter(goals::user_id.eq(*user_id.as_uuid()))
            .select(GoalRow::as_select())
            .into_boxed();
        query = match options.order {
            SortOrder::NewestFirst => query.order((goals::created_at.desc(), goals::id.desc())),
            SortOrder::OldestFirst => query.order((goals::created_at.asc(), goals::id.asc())),
        };
        if let Some(limit) = options.limit {
            query = query.limit(i64::from(limit));
        }
        let rows: Vec<GoalRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(GoalRow::into_domain), TenantDataError::corrupt)
    }

    async fn count_all(&self) -> Result<u64, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        goals::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(from_sql_count)
            .map_err(map_diesel_error)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(goals::table.filter(goals::user_id.eq(*user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(to_count)
            .map_err(map_diesel_error)
    }
}
