//! Tenant isolation audit runner.
//!
//! All steps are awaited one after another from the caller's task. A failing
//! port call aborts only the check it belongs to; cleanup always runs.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::fixture::{TenantFixture, TenantRows};
use super::report::{AuditReport, CheckName, CheckResult, TenantTable, Violation};
use crate::domain::UserId;
use crate::domain::ports::{
    GoalRepository, InsightRepository, ListOptions, MoodEntryRepository, PurgeScope,
    SortOrder, TenantDataError, TenantDataRepository, UserOverviewQuery,
};

/// Default soft budget for [`TenantIsolationAudit::load_smoke`].
pub const DEFAULT_LOAD_BUDGET: Duration = Duration::from_secs(5);

/// Ports the audit drives.
#[derive(Clone)]
pub struct AuditPorts {
    /// Bulk seed and purge.
    pub tenant_data: Arc<dyn TenantDataRepository>,
    /// Mood journal table.
    pub moods: Arc<dyn MoodEntryRepository>,
    /// Insights table.
    pub insights: Arc<dyn InsightRepository>,
    /// Goals table.
    pub goals: Arc<dyn GoalRepository>,
    /// Relation-loading query.
    pub overview: Arc<dyn UserOverviewQuery>,
}

/// Minimal view of a listed row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RowRef {
    id: Uuid,
    owner: UserId,
}

type Listing = HashMap<(TenantTable, UserId), Vec<RowRef>>;

/// Verifies that per-user queries never cross tenant boundaries.
#[derive(Clone)]
pub struct TenantIsolationAudit {
    ports: AuditPorts,
}

struct StepTimer {
    name: CheckName,
    started: Instant,
    violations: Vec<Violation>,
}

impl StepTimer {
    fn start(name: CheckName) -> Self {
        debug!(check = %name, "audit check started");
        Self {
            name,
            started: Instant::now(),
            violations: Vec::new(),
        }
    }

    fn record(&mut self, violation: Violation) {
        error!(check = %self.name, %violation, "tenant isolation violation");
        self.violations.push(violation);
    }

    fn fail(&mut self, err: &TenantDataError) {
        self.record(Violation::StepError {
            message: err.to_string(),
        });
    }

    fn finish(self) -> CheckResult {
        let result = CheckResult {
            name: self.name,
            violations: self.violations,
            elapsed: self.started.elapsed(),
        };
        if result.passed() {
            info!(check = %result.name, elapsed_ms = result.elapsed.as_millis(), "audit check passed");
        } else {
            error!(
                check = %result.name,
                violations = result.violations.len(),
                "audit check failed"
            );
        }
        result
    }
}

fn count_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

impl TenantIsolationAudit {
    /// Create an audit over the given ports.
    pub fn new(ports: AuditPorts) -> Self {
        Self { ports }
    }

    /// Run every check for `fixture` and always clean up afterwards.
    pub async fn run(&self, fixture: &TenantFixture) -> AuditReport {
        let started = Instant::now();
        info!(
            tenants = fixture.tenants().len(),
            rows = fixture.row_count(),
            "tenant isolation audit started"
        );
        let mut checks = Vec::new();

        let seed = self.seed(fixture).await;
        let seeded = seed.passed();
        checks.push(seed);

        if seeded {
            let (isolation, completeness, listing) = self.isolation_and_completeness(fixture).await;
            checks.push(isolation);
            checks.push(completeness);
            checks.push(self.ordered_limit(fixture).await);
            checks.push(self.aggregate_counts(fixture).await);
            checks.push(self.relational_agreement(fixture, listing.as_ref()).await);
            checks.push(self.cross_table_independence(fixture).await);
        } else {
            warn!("seed failed; skipping read checks");
        }

        checks.push(self.cleanup(fixture).await);
        checks.push(self.cleanup_repeat(fixture).await);

        let report = AuditReport {
            checks,
            elapsed: started.elapsed(),
            tenants: fixture.tenants().len(),
            rows: fixture.row_count(),
            budget: None,
        };
        if report.passed() {
            info!(elapsed_ms = report.elapsed.as_millis(), "tenant isolation audit passed");
        } else {
            error!(
                violations = report.violations().count(),
                "tenant isolation audit failed"
            );
        }
        report
    }

    /// Run the audit over a larger fixture and compare wall-clock time with a
    /// soft budget. Exceeding the budget only logs a warning.
    pub async fn load_smoke(&self, fixture: &TenantFixture, budget: Duration) -> AuditReport {
        let mut report = self.run(fixture).await;
        report.budget = Some(budget);
        if report.over_budget() {
            warn!(
                elapsed_ms = report.elapsed.as_millis(),
                budget_ms = budget.as_millis(),
                tenants = report.tenants,
                "tenant isolation load run exceeded its time budget"
            );
        }
        report
    }

    async fn seed(&self, fixture: &TenantFixture) -> CheckResult {
        let mut step = StepTimer::start(CheckName::Seed);
        if let Err(err) = self.ports.tenant_data.seed(&fixture.to_seed()).await {
            step.fail(&err);
        }
        step.finish()
    }

    async fn list(
        &self,
        table: TenantTable,
        user: &UserId,
        options: ListOptions,
    ) -> Result<Vec<RowRef>, TenantDataError> {
        let rows = match table {
            TenantTable::MoodEntries => self
                .ports
                .moods
                .list_for_user(user, options)
                .await?
                .into_iter()
                .map(|row| RowRef {
                    id: row.id,
                    owner: row.user_id,
                })
                .collect(),
            TenantTable::Insights => self
                .ports
                .insights
                .list_for_user(user, options)
                .await?
                .into_iter()
                .map(|row| RowRef {
                    id: row.id,
                    owner: row.user_id,
                })
                .collect(),
            TenantTable::Goals => self
                .ports
                .goals
                .list_for_user(user, options)
                .await?
                .into_iter()
                .map(|row| RowRef {
                    id: row.id,
                    owner: row.user_id,
                })
                .collect(),
        };
        Ok(rows)
    }

    async fn count_all(&self, table: TenantTable) -> Result<u64, TenantDataError> {
        match table {
            TenantTable::MoodEntries => self.ports.moods.count_all().await,
            TenantTable::Insights => self.ports.insights.count_all().await,
            TenantTable::Goals => self.ports.goals.count_all().await,
        }
    }

    async fn delete_for_user(
        &self,
        table: TenantTable,
        user: &UserId,
    ) -> Result<u64, TenantDataError> {
        match table {
            TenantTable::MoodEntries => self.ports.moods.delete_for_user(user).await,
            TenantTable::Insights => self.ports.insights.delete_for_user(user).await,
            TenantTable::Goals => self.ports.goals.delete_for_user(user).await,
        }
    }

    /// Lists every (table, tenant) pair once and evaluates both isolation and
    /// completeness against that listing. The listing is returned for the
    /// relational check when every call succeeded.
    async fn isolation_and_completeness(
        &self,
        fixture: &TenantFixture,
    ) -> (CheckResult, CheckResult, Option<Listing>) {
        let mut isolation = StepTimer::start(CheckName::Isolation);
        let mut listing = Listing::new();
        let mut complete_listing = true;
        for tenant in fixture.tenants() {
            for table in TenantTable::ALL {
                match self.list(table, tenant.user_id(), ListOptions::default()).await {
                    Ok(rows) => {
                        for row in rows.iter().filter(|row| row.owner != *tenant.user_id()) {
                            isolation.record(Violation::ForeignRow {
                                table,
                                queried_user: tenant.user_id().clone(),
                                owner: row.owner.clone(),
                                row_id: row.id,
                            });
                        }
                        listing.insert((table, tenant.user_id().clone()), rows);
                    }
                    Err(err) => {
                        isolation.fail(&err);
                        complete_listing = false;
                    }
                }
            }
        }
        let isolation = isolation.finish();

        let mut completeness = StepTimer::start(CheckName::Completeness);
        for tenant in fixture.tenants() {
            for table in TenantTable::ALL {
                match listing.get(&(table, tenant.user_id().clone())) {
                    Some(rows) => check_complete(&mut completeness, table, tenant, rows),
                    None => completeness.record(Violation::StepError {
                        message: format!("{table} listing unavailable for {}", tenant.user_id()),
                    }),
                }
            }
        }
        let completeness = completeness.finish();

        (isolation, completeness, complete_listing.then_some(listing))
    }

    async fn ordered_limit(&self, fixture: &TenantFixture) -> CheckResult {
        let mut step = StepTimer::start(CheckName::OrderedLimit);
        let options = ListOptions::default()
            .with_order(SortOrder::NewestFirst)
            .with_limit(1);
        for tenant in fixture.tenants() {
            for table in TenantTable::ALL {
                let Some(newest) = tenant.row_ids(table).last().copied() else {
                    continue;
                };
                match self.list(table, tenant.user_id(), options).await {
                    Ok(rows) => {
                        if rows.len() != 1 {
                            step.record(Violation::CountMismatch {
                                table,
                                user: Some(tenant.user_id().clone()),
                                context: "rows returned with limit 1".into(),
                                expected: 1,
                                actual: count_u64(rows.len()),
                            });
                        } else if rows[0].id != newest {
                            step.record(Violation::MissingRow {
                                table,
                                user: tenant.user_id().clone(),
                                row_id: newest,
                            });
                        }
                    }
                    Err(err) => step.fail(&err),
                }
            }
        }
        step.finish()
    }

    async fn aggregate_counts(&self, fixture: &TenantFixture) -> CheckResult {
        let mut step = StepTimer::start(CheckName::AggregateCounts);
        for table in TenantTable::ALL {
            let expected = fixture.expected_total(table);
            match self.count_all(table).await {
                Ok(actual) if actual < expected => step.record(Violation::CountMismatch {
                    table,
                    user: None,
                    context: "store-wide row count (lower bound)".into(),
                    expected,
                    actual,
                }),
                Ok(_) => {}
                Err(err) => step.fail(&err),
            }
        }
        step.finish()
    }

    async fn relational_agreement(
        &self,
        fixture: &TenantFixture,
        listing: Option<&Listing>,
    ) -> CheckResult {
        let mut step = StepTimer::start(CheckName::RelationalAgreement);
        let Some(listing) = listing else {
            step.record(Violation::StepError {
                message: "per-table listing incomplete; nothing to compare".into(),
            });
            return step.finish();
        };
        for tenant in fixture.tenants() {
            let overview = match self.ports.overview.fetch(tenant.user_id()).await {
                Ok(Some(overview)) => overview,
                Ok(None) => {
                    step.record(Violation::StepError {
                        message: format!("user {} not found by relation query", tenant.user_id()),
                    });
                    continue;
                }
                Err(err) => {
                    step.fail(&err);
                    continue;
                }
            };
            let related = [
                (TenantTable::MoodEntries, overview.mood_entries.len()),
                (TenantTable::Insights, overview.insights.len()),
                (TenantTable::Goals, overview.goals.len()),
            ];
            for (table, related_count) in related {
                let direct = listing
                    .get(&(table, tenant.user_id().clone()))
                    .map_or(0, Vec::len);
                if related_count != direct {
                    step.record(Violation::CountMismatch {
                        table,
                        user: Some(tenant.user_id().clone()),
                        context: "relation-loaded rows versus direct listing".into(),
                        expected: count_u64(direct),
                        actual: count_u64(related_count),
                    });
                }
            }
            let foreign_rows = overview
                .goals
                .iter()
                .map(|goal| (TenantTable::Goals, goal.id, &goal.user_id))
                .chain(
                    overview
                        .mood_entries
                        .iter()
                        .map(|entry| (TenantTable::MoodEntries, entry.id, &entry.user_id)),
                )
                .chain(
                    overview
                        .insights
                        .iter()
                        .map(|insight| (TenantTable::Insights, insight.id, &insight.user_id)),
                )
                .filter(|(_, _, owner)| *owner != tenant.user_id())
                .collect::<Vec<_>>();
            for (table, row_id, owner) in foreign_rows {
                step.record(Violation::ForeignRow {
                    table,
                    queried_user: tenant.user_id().clone(),
                    owner: owner.clone(),
                    row_id,
                });
            }
        }
        step.finish()
    }

    /// Deletes the first tenant's mood entries and checks that no other table
    /// or tenant changed.
    async fn cross_table_independence(&self, fixture: &TenantFixture) -> CheckResult {
        let mut step = StepTimer::start(CheckName::CrossTableIndependence);
        let Some(target) = fixture.tenants().first() else {
            return step.finish();
        };
        let deleted_table = TenantTable::MoodEntries;

        match self.delete_for_user(deleted_table, target.user_id()).await {
            Ok(deleted) => {
                let expected = count_u64(target.row_ids(deleted_table).len());
                if deleted != expected {
                    step.record(Violation::CountMismatch {
                        table: deleted_table,
                        user: Some(target.user_id().clone()),
                        context: "rows deleted".into(),
                        expected,
                        actual: deleted,
                    });
                }
            }
            Err(err) => {
                step.fail(&err);
                return step.finish();
            }
        }

        for tenant in fixture.tenants() {
            for table in TenantTable::ALL {
                let expected = if table == deleted_table && tenant.user_id() == target.user_id() {
                    0
                } else {
                    count_u64(tenant.row_ids(table).len())
                };
                match self.list(table, tenant.user_id(), ListOptions::default()).await {
                    Ok(rows) if count_u64(rows.len()) != expected => {
                        step.record(Violation::CountMismatch {
                            table,
                            user: Some(tenant.user_id().clone()),
                            context: format!(
                                "rows after deleting {deleted_table} for {}",
                                target.label
                            ),
                            expected,
                            actual: count_u64(rows.len()),
                        });
                    }
                    Ok(_) => {}
                    Err(err) => step.fail(&err),
                }
            }
        }
        step.finish()
    }

    async fn cleanup(&self, fixture: &TenantFixture) -> CheckResult {
        let mut step = StepTimer::start(CheckName::Cleanup);
        let users = fixture.user_ids();
        match self
            .ports
            .tenant_data
            .purge(&users, PurgeScope::Everything)
            .await
        {
            Ok(summary) => {
                debug!(
                    mood_entries = summary.mood_entries,
                    insights = summary.insights,
                    goals = summary.goals,
                    users = summary.users,
                    "fixture purged"
                );
                for tenant in fixture.tenants() {
                    for table in TenantTable::ALL {
                        match self.list(table, tenant.user_id(), ListOptions::default()).await {
                            Ok(rows) if !rows.is_empty() => {
                                step.record(Violation::CountMismatch {
                                    table,
                                    user: Some(tenant.user_id().clone()),
                                    context: "rows left after cleanup".into(),
                                    expected: 0,
                                    actual: count_u64(rows.len()),
                                });
                            }
                            Ok(_) => {}
                            Err(err) => step.fail(&err),
                        }
                    }
                }
            }
            Err(err) => step.fail(&err),
        }
        step.finish()
    }

    async fn cleanup_repeat(&self, fixture: &TenantFixture) -> CheckResult {
        let mut step = StepTimer::start(CheckName::CleanupRepeat);
        match self
            .ports
            .tenant_data
            .purge(&fixture.user_ids(), PurgeScope::Everything)
            .await
        {
            Ok(removed) if removed.total() != 0 => {
                step.record(Violation::RepeatCleanupRemovedRows { removed });
            }
            Ok(_) => {}
            Err(err) => step.fail(&err),
        }
        step.finish()
    }
}

fn check_complete(step: &mut StepTimer, table: TenantTable, tenant: &TenantRows, rows: &[RowRef]) {
    let returned: BTreeSet<Uuid> = rows
        .iter()
        .filter(|row| row.owner == *tenant.user_id())
        .map(|row| row.id)
        .collect();
    let seeded = tenant.row_ids(table);
    for row_id in seeded.iter().filter(|id| !returned.contains(id)) {
        step.record(Violation::MissingRow {
            table,
            user: tenant.user_id().clone(),
            row_id: *row_id,
        });
    }
    if rows.len() != seeded.len() {
        step.record(Violation::CountMismatch {
            table,
            user: Some(tenant.user_id().clone()),
            context: "rows listed for user".into(),
            expected: count_u64(seeded.len()),
            actual: count_u64(rows.len()),
        });
    }
}
