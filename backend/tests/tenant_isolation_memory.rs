//! Tenant isolation audit against the in-memory adapter.
//!
//! Always runs; the PostgreSQL suite in `tenant_isolation_postgres.rs` runs
//! the same checks when a database is available.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mindtrack::domain::ports::{ListOptions, MoodEntryRepository, TenantDataError};
use mindtrack::domain::tenant_isolation::DEFAULT_LOAD_BUDGET;
use mindtrack::domain::{
    AuditPorts, CheckName, MoodEntry, TenantFixture, TenantIsolationAudit, TenantTable, UserId,
    Violation,
};
use mindtrack::outbound::memory::InMemoryStore;
use rstest::{fixture, rstest};

#[fixture]
fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

fn ports(store: &Arc<InMemoryStore>) -> AuditPorts {
    AuditPorts {
        tenant_data: store.clone(),
        moods: store.clone(),
        insights: store.clone(),
        goals: store.clone(),
        overview: store.clone(),
    }
}

/// Mood repository that answers every per-user listing with every user's
/// rows, the way a query missing its owner filter would.
struct UnfilteredMoods {
    inner: Arc<InMemoryStore>,
    everyone: Vec<UserId>,
}

#[async_trait]
impl MoodEntryRepository for UnfilteredMoods {
    async fn insert(&self, entry: &MoodEntry) -> Result<(), TenantDataError> {
        MoodEntryRepository::insert(&*self.inner, entry).await
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<MoodEntry>, TenantDataError> {
        let mut rows = Vec::new();
        for user in &self.everyone {
            rows.extend(MoodEntryRepository::list_for_user(&*self.inner, user, options).await?);
        }
        Ok(rows)
    }

    async fn count_all(&self) -> Result<u64, TenantDataError> {
        MoodEntryRepository::count_all(&*self.inner).await
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError> {
        MoodEntryRepository::delete_for_user(&*self.inner, user_id).await
    }
}

#[rstest]
#[tokio::test]
async fn standard_fixture_passes_every_check(store: Arc<InMemoryStore>) {
    let fixture = TenantFixture::standard().expect("fixture");
    let report = TenantIsolationAudit::new(ports(&store)).run(&fixture).await;

    assert!(
        report.passed(),
        "violations: {:?}",
        report.violations().collect::<Vec<_>>()
    );
    for name in [
        CheckName::Seed,
        CheckName::Isolation,
        CheckName::Completeness,
        CheckName::OrderedLimit,
        CheckName::AggregateCounts,
        CheckName::RelationalAgreement,
        CheckName::CrossTableIndependence,
        CheckName::Cleanup,
        CheckName::CleanupRepeat,
    ] {
        assert!(report.check(name).is_some(), "{name} did not run");
    }
    assert_eq!(report.tenants, 2);
}

#[rstest]
#[tokio::test]
async fn audit_leaves_no_rows_behind(store: Arc<InMemoryStore>) {
    let fixture = TenantFixture::standard().expect("fixture");
    TenantIsolationAudit::new(ports(&store)).run(&fixture).await;

    assert_eq!(
        MoodEntryRepository::count_all(&*store).await.expect("count"),
        0
    );
    for tenant in fixture.tenants() {
        let left = MoodEntryRepository::list_for_user(
            &*store,
            tenant.user_id(),
            ListOptions::default(),
        )
        .await
        .expect("list");
        assert!(left.is_empty());
    }
}

#[rstest]
#[tokio::test]
async fn audit_can_run_twice_on_one_store(store: Arc<InMemoryStore>) {
    let audit = TenantIsolationAudit::new(ports(&store));
    let first = audit.run(&TenantFixture::standard().expect("fixture")).await;
    let second = audit.run(&TenantFixture::standard().expect("fixture")).await;
    assert!(first.passed());
    assert!(second.passed());
}

#[rstest]
#[tokio::test]
async fn synthetic_load_keeps_isolation_within_budget(store: Arc<InMemoryStore>) {
    let fixture = TenantFixture::synthetic(10, 5, 7).expect("fixture");
    let report = TenantIsolationAudit::new(ports(&store))
        .load_smoke(&fixture, DEFAULT_LOAD_BUDGET)
        .await;

    assert!(report.passed());
    assert_eq!(report.tenants, 10);
    assert_eq!(report.budget, Some(Duration::from_secs(5)));
    assert!(!report.over_budget(), "took {:?}", report.elapsed);
}

#[rstest]
#[tokio::test]
async fn exceeding_the_budget_does_not_fail_the_report(store: Arc<InMemoryStore>) {
    let fixture = TenantFixture::synthetic(2, 1, 1).expect("fixture");
    let report = TenantIsolationAudit::new(ports(&store))
        .load_smoke(&fixture, Duration::ZERO)
        .await;

    assert!(report.over_budget());
    assert!(report.passed());
}

#[rstest]
#[tokio::test]
async fn unfiltered_listing_is_reported_as_foreign_rows(store: Arc<InMemoryStore>) {
    let fixture = TenantFixture::standard().expect("fixture");
    let mut audit_ports = ports(&store);
    audit_ports.moods = Arc::new(UnfilteredMoods {
        inner: store.clone(),
        everyone: fixture.user_ids(),
    });

    let report = TenantIsolationAudit::new(audit_ports).run(&fixture).await;

    assert!(!report.passed());
    let isolation = report.check(CheckName::Isolation).expect("isolation ran");
    assert!(isolation.violations.iter().any(|violation| matches!(
        violation,
        Violation::ForeignRow {
            table: TenantTable::MoodEntries,
            ..
        }
    )));
    // cleanup still ran and succeeded
    assert!(
        report
            .check(CheckName::Cleanup)
            .is_some_and(|check| check.passed())
    );
}
