//! Port for mood journal persistence.
use async_trait::async_trait;

use crate::domain::{MoodEntry, UserId};

use super::{ListOptions, TenantDataError};

/// Persistence for [`MoodEntry`] rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MoodEntryRepository: Send + Sync {
    /// Store a new entry.
    async fn insert(&self, entry: &MoodEntry) -> Result<(), TenantDataError>;

    /// Entries owned by `user_id`, ordered by `recorded_at`.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<MoodEntry>, TenantDataError>;

    /// Total entries across all users.
    async fn count_all(&self) -> Result<u64, TenantDataError>;

    /// Remove every entry owned by `user_id`, returning the number deleted.
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError>;
}
