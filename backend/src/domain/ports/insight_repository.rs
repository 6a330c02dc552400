//! Port for stored insights.
use async_trait::async_trait;

use crate::domain::{Insight, UserId};

use super::{ListOptions, TenantDataError};

/// Persistence for [`Insight`] rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightRepository: Send + Sync {
    /// Store a new insight.
    async fn insert(&self, insight: &Insight) -> Result<(), TenantDataError>;

    /// Insights owned by `user_id`, ordered by `created_at`.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<Insight>, TenantDataError>;

    /// Total insights across all users.
    async fn count_all(&self) -> Result<u64, TenantDataError>;

    /// Remove every insight owned by `user_id`, returning the number deleted.
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError>;
}
