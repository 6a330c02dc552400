//! Port for goal persistence.
//!
//! Single-row operations take the owner alongside the goal id so adapters
//! can never touch another user's goal.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Goal, UserId};

use super::{ListOptions, TenantDataError};

/// Persistence for [`Goal`] rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Store a new goal.
    async fn insert(&self, goal: &Goal) -> Result<(), TenantDataError>;

    /// Fetch one goal owned by `user_id`.
    async fn find(&self, user_id: &UserId, goal_id: Uuid)
    -> Result<Option<Goal>, TenantDataError>;

    /// Persist progress, status and `updated_at`. Returns `false` when no goal
    /// with that id belongs to the goal's owner.
    async fn update(&self, goal: &Goal) -> Result<bool, TenantDataError>;

    /// Delete one goal owned by `user_id`. Returns `false` when nothing matched.
    async fn delete(&self, user_id: &UserId, goal_id: Uuid) -> Result<bool, TenantDataError>;

    /// Goals owned by `user_id`, ordered by `created_at`.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<Goal>, TenantDataError>;

    /// Total goals across all users.
    async fn count_all(&self) -> Result<u64, TenantDataError>;

    /// Remove every goal owned by `user_id`, returning the number deleted.
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError>;
}
