//! Tenant isolation audit.
//!
//! Seeds a [`TenantFixture`] through the ports, checks that per-user reads
//! only ever see the caller's rows, then purges the fixture. The audit is
//! storage agnostic; it runs against whichever adapters back the ports.

mod audit;
mod fixture;
mod report;

pub use audit::{AuditPorts, DEFAULT_LOAD_BUDGET, TenantIsolationAudit};
pub use fixture::{FixtureError, TenantFixture, TenantFixtureBuilder, TenantRows, TenantSpec};
pub use report::{AuditReport, CheckName, CheckResult, TenantTable, Violation};
