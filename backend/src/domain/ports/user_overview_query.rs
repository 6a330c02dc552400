//! Relation-loading read port: a user together with all their journal rows.
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Goal, Insight, MoodEntry, User, UserId};

use super::TenantDataError;

/// A user and every row they own in the tenant tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOverview {
    /// Owning user.
    pub user: User,
    /// Mood entries, newest first.
    pub mood_entries: Vec<MoodEntry>,
    /// Insights, newest first.
    pub insights: Vec<Insight>,
    /// Goals, newest first.
    pub goals: Vec<Goal>,
}

/// Loads a [`UserOverview`] in one relation-loading call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserOverviewQuery: Send + Sync {
    /// Fetch the overview, or `None` when the user does not exist.
    async fn fetch(&self, user_id: &UserId) -> Result<Option<UserOverview>, TenantDataError>;
}
