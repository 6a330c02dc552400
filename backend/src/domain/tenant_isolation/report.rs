//! Audit report model.
//!
//! Every check yields a [`CheckResult`]; any violation fails the check and
//! therefore the whole report.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::PurgeSummary;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(millis(*duration))
}

fn as_optional_millis<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(duration) => serializer.serialize_some(&millis(*duration)),
        None => serializer.serialize_none(),
    }
}

/// Per-user tables covered by the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantTable {
    /// `mood_entries`
    MoodEntries,
    /// `insights`
    Insights,
    /// `goals`
    Goals,
}

impl TenantTable {
    /// Every audited table.
    pub const ALL: [Self; 3] = [Self::MoodEntries, Self::Insights, Self::Goals];

    /// Table name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoodEntries => "mood_entries",
            Self::Insights => "insights",
            Self::Goals => "goals",
        }
    }
}

impl fmt::Display for TenantTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    /// Bulk insert of the fixture.
    Seed,
    /// No listed row belongs to another user.
    Isolation,
    /// Listing returns exactly the seeded rows.
    Completeness,
    /// Newest-first listing with a limit returns the newest seeded row.
    OrderedLimit,
    /// Store-wide counts cover at least the seeded rows.
    AggregateCounts,
    /// Relation loading agrees with per-table listing.
    RelationalAgreement,
    /// Deleting one table for one user leaves everything else intact.
    CrossTableIndependence,
    /// Purge removes every fixture row.
    Cleanup,
    /// A second purge succeeds and removes nothing.
    CleanupRepeat,
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seed => "seed",
            Self::Isolation => "isolation",
            Self::Completeness => "completeness",
            Self::OrderedLimit => "ordered_limit",
            Self::AggregateCounts => "aggregate_counts",
            Self::RelationalAgreement => "relational_agreement",
            Self::CrossTableIndependence => "cross_table_independence",
            Self::Cleanup => "cleanup",
            Self::CleanupRepeat => "cleanup_repeat",
        };
        f.write_str(name)
    }
}

/// A single broken expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A list for `queried_user` returned a row owned by `owner`.
    ForeignRow {
        /// Table listed.
        table: TenantTable,
        /// User whose rows were requested.
        queried_user: UserId,
        /// Actual owner of the row.
        owner: UserId,
        /// Offending row.
        row_id: Uuid,
    },
    /// A seeded row was not returned for its owner.
    MissingRow {
        /// Table listed.
        table: TenantTable,
        /// Owner of the row.
        user: UserId,
        /// Seeded row id.
        row_id: Uuid,
    },
    /// A count differed from what the fixture implies.
    CountMismatch {
        /// Table counted.
        table: TenantTable,
        /// User the count was scoped to; `None` for store-wide counts.
        #[serde(skip_serializing_if = "Option::is_none")]
        user: Option<UserId>,
        /// What was counted.
        context: String,
        /// Expected value (a lower bound for store-wide counts).
        expected: u64,
        /// Observed value.
        actual: u64,
    },
    /// A second cleanup still found rows to delete.
    RepeatCleanupRemovedRows {
        /// Per-table counts the repeated purge removed.
        removed: PurgeSummary,
    },
    /// A port call failed, aborting the check.
    StepError {
        /// Error text.
        message: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignRow {
                table,
                queried_user,
                owner,
                row_id,
            } => write!(
                f,
                "{table}: row {row_id} owned by {owner} returned for {queried_user}"
            ),
            Self::MissingRow {
                table,
                user,
                row_id,
            } => write!(f, "{table}: seeded row {row_id} missing for {user}"),
            Self::CountMismatch {
                table,
                user,
                context,
                expected,
                actual,
            } => match user {
                Some(user) => write!(
                    f,
                    "{table}: {context} for {user} expected {expected}, got {actual}"
                ),
                None => write!(f, "{table}: {context} expected {expected}, got {actual}"),
            },
            Self::RepeatCleanupRemovedRows { removed } => write!(
                f,
                "repeated cleanup removed {} rows ({} mood entries, {} insights, {} goals, {} users)",
                removed.total(),
                removed.mood_entries,
                removed.insights,
                removed.goals,
                removed.users
            ),
            Self::StepError { message } => write!(f, "step failed: {message}"),
        }
    }
}

/// Outcome of one audit step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Step name.
    pub name: CheckName,
    /// Broken expectations; empty when the check passed.
    pub violations: Vec<Violation>,
    /// Wall-clock duration of the step.
    #[serde(rename = "elapsedMs", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl CheckResult {
    /// Whether the check found no violations.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Result of a full audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Step outcomes in execution order.
    pub checks: Vec<CheckResult>,
    /// Total wall-clock duration.
    #[serde(rename = "elapsedMs", serialize_with = "as_millis")]
    pub elapsed: Duration,
    /// Number of tenants seeded.
    pub tenants: usize,
    /// Number of rows seeded across tenant tables.
    pub rows: usize,
    /// Soft time budget, for load runs.
    #[serde(
        rename = "budgetMs",
        serialize_with = "as_optional_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget: Option<Duration>,
}

impl AuditReport {
    /// Whether every check passed. Time budgets never fail a report.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(CheckResult::passed)
    }

    /// Whether the run exceeded its soft budget.
    pub fn over_budget(&self) -> bool {
        self.budget.is_some_and(|budget| self.elapsed > budget)
    }

    /// Look up a check by name.
    pub fn check(&self, name: CheckName) -> Option<&CheckResult> {
        self.checks.iter().find(|check| check.name == name)
    }

    /// Every violation across checks.
    pub fn violations(&self) -> impl Iterator<Item = (CheckName, &Violation)> {
        self.checks
            .iter()
            .flat_map(|check| check.violations.iter().map(move |v| (check.name, v)))
    }
}
