//! Shared vocabulary for ports over per-user ("tenant") tables, plus the
//! bulk seed and purge port used by the isolation audit and data erasure.
//!
//! Every tenant table is keyed by its owning [`UserId`]; list operations
//! filter on that key and nothing else.

use async_trait::async_trait;

use crate::domain::{Goal, Insight, MoodEntry, UserId};

use super::{UserAccount, define_port_error};

define_port_error! {
    /// Errors raised by adapters over the per-user tables.
    pub enum TenantDataError {
        /// Store connection could not be established.
        Connection { message: String } => "tenant data connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "tenant data query failed: {message}",
        /// A stored row could not be mapped back into a domain value.
        Corrupt { message: String } => "tenant data row is invalid: {message}",
    }
}

/// Timestamp ordering applied to list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    NewestFirst,
    /// Oldest first.
    OldestFirst,
}

/// Ordering and limit for `list_for_user` queries.
///
/// # Examples
/// ```
/// use mindtrack::domain::ports::{ListOptions, SortOrder};
///
/// let options = ListOptions::default().with_limit(30);
/// assert_eq!(options.limit, Some(30));
/// assert_eq!(options.order, SortOrder::NewestFirst);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Timestamp ordering.
    pub order: SortOrder,
    /// Maximum rows to return; all rows when `None`.
    pub limit: Option<u32>,
}

impl ListOptions {
    /// Cap the number of returned rows.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Change the ordering.
    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// Rows written atomically by [`TenantDataRepository::seed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantSeed {
    /// Accounts inserted first.
    pub users: Vec<UserAccount>,
    /// Mood entries referencing the seeded users.
    pub mood_entries: Vec<MoodEntry>,
    /// Insights referencing the seeded users.
    pub insights: Vec<Insight>,
    /// Goals referencing the seeded users.
    pub goals: Vec<Goal>,
}

/// What [`TenantDataRepository::purge`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeScope {
    /// Mood entries, insights and goals only; accounts are kept.
    JournalOnly,
    /// Journal rows, settings, memberships, contact requests and the accounts.
    Everything,
}

/// Row counts removed by a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeSummary {
    /// Mood entries deleted.
    pub mood_entries: u64,
    /// Insights deleted.
    pub insights: u64,
    /// Goals deleted.
    pub goals: u64,
    /// Accounts deleted.
    pub users: u64,
}

impl PurgeSummary {
    /// Total rows deleted across tables.
    pub fn total(&self) -> u64 {
        self.mood_entries + self.insights + self.goals + self.users
    }
}

/// Bulk writes over all tenant tables.
///
/// Both operations are atomic: either every row is written (or removed) or
/// none is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantDataRepository: Send + Sync {
    /// Insert users first, then their dependent rows.
    async fn seed(&self, seed: &TenantSeed) -> Result<(), TenantDataError>;

    /// Delete dependent rows before parent rows for each user. Users without
    /// rows are skipped, so repeating a purge succeeds with zero counts.
    async fn purge(
        &self,
        users: &[UserId],
        scope: PurgeScope,
    ) -> Result<PurgeSummary, TenantDataError>;
}

impl From<TenantDataError> for crate::domain::Error {
    fn from(error: TenantDataError) -> Self {
        match error {
            TenantDataError::Connection { message } => {
                Self::service_unavailable(format!("journal store unavailable: {message}"))
            }
            TenantDataError::Query { message } | TenantDataError::Corrupt { message } => {
                Self::internal(format!("journal store error: {message}"))
            }
        }
    }
}
