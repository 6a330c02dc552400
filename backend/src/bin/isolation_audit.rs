//! Run the tenant isolation audit and print a JSON report.
//!
//! The audit seeds a standard two-tenant fixture and, unless skipped, a
//! synthetic load fixture, then checks that no per-user query returns
//! another tenant's rows. With `--probe-url` it also checks that a running
//! server rejects every protected route without a session. The process exits
//! non-zero when any check fails.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use mindtrack::domain::{AuditPorts, AuditReport, TenantFixture, TenantIsolationAudit};
use mindtrack::inbound::http::routes::PROTECTED_ROUTES;
use mindtrack::outbound::memory::InMemoryStore;
use mindtrack::outbound::persistence::{
    DbPool, DieselGoalRepository, DieselInsightRepository, DieselMoodEntryRepository,
    DieselTenantDataRepository, DieselUserOverviewQuery, PoolConfig, drop_schema,
    run_pending_migrations,
};

/// `isolation-audit` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "isolation-audit",
    about = "Verify that per-user queries never return another tenant's rows",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `MINDTRACK_DATABASE_URL`; the
    /// in-memory adapter is audited when neither is set.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Audit inside this throwaway schema, migrated first and dropped after.
    #[arg(long, value_name = "name")]
    schema: Option<String>,
    /// Synthetic tenants in the load run.
    #[arg(long, default_value_t = 10)]
    tenants: usize,
    /// Rows per table for each synthetic tenant.
    #[arg(long, default_value_t = 5)]
    rows: usize,
    /// Seed for synthetic row content.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Soft time budget for the load run, in milliseconds.
    #[arg(long = "budget-ms", default_value_t = 5_000)]
    budget_ms: u64,
    /// Skip the synthetic load run.
    #[arg(long)]
    skip_load: bool,
    /// Base URL of a running server whose protected routes should be probed.
    #[arg(long = "probe-url", value_name = "url")]
    probe_url: Option<String>,
}

/// Outcome of one unauthenticated request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeOutcome {
    method: &'static str,
    path: &'static str,
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    passed: bool,
}

/// Everything the binary prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    adapter: &'static str,
    standard: AuditReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    load: Option<AuditReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unauthenticated: Option<Vec<ProbeOutcome>>,
    passed: bool,
}

impl RunReport {
    fn finish(mut self) -> Self {
        self.passed = self.standard.passed()
            && self.load.as_ref().is_none_or(AuditReport::passed)
            && self
                .unauthenticated
                .as_ref()
                .is_none_or(|probes| probes.iter().all(|probe| probe.passed));
        self
    }
}

fn memory_ports() -> AuditPorts {
    let store = Arc::new(InMemoryStore::new());
    AuditPorts {
        tenant_data: store.clone(),
        moods: store.clone(),
        insights: store.clone(),
        goals: store.clone(),
        overview: store,
    }
}

fn diesel_ports(pool: &DbPool) -> AuditPorts {
    AuditPorts {
        tenant_data: Arc::new(DieselTenantDataRepository::new(pool.clone())),
        moods: Arc::new(DieselMoodEntryRepository::new(pool.clone())),
        insights: Arc::new(DieselInsightRepository::new(pool.clone())),
        goals: Arc::new(DieselGoalRepository::new(pool.clone())),
        overview: Arc::new(DieselUserOverviewQuery::new(pool.clone())),
    }
}

async fn connect(database_url: &str, schema: Option<&str>) -> Result<DbPool> {
    let applied = run_pending_migrations(database_url, schema)
        .await
        .wrap_err("running database migrations")?;
    info!(applied, schema, "database migrations complete");
    let mut config = PoolConfig::new(database_url);
    if let Some(schema) = schema {
        config = config.with_schema(schema);
    }
    DbPool::new(config).await.wrap_err("creating database pool")
}

async fn probe(base_url: &str) -> Result<Vec<ProbeOutcome>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .wrap_err("building HTTP client")?;
    let base = base_url.trim_end_matches('/');
    let mut outcomes = Vec::with_capacity(PROTECTED_ROUTES.len());
    for route in PROTECTED_ROUTES {
        let method = Method::from_bytes(route.method.as_bytes())
            .wrap_err_with(|| format!("invalid method {}", route.method))?;
        let url = format!("{base}/api/v1{}", route.path);
        let outcome = match client.request(method, &url).send().await {
            Ok(response) => {
                let status = response.status();
                let passed = status == StatusCode::UNAUTHORIZED;
                if !passed {
                    error!(method = route.method, path = route.path, %status, "protected route answered without a session");
                }
                ProbeOutcome {
                    method: route.method,
                    path: route.path,
                    status: Some(status.as_u16()),
                    error: None,
                    passed,
                }
            }
            Err(err) => {
                error!(method = route.method, path = route.path, error = %err, "probe request failed");
                ProbeOutcome {
                    method: route.method,
                    path: route.path,
                    status: None,
                    error: Some(err.to_string()),
                    passed: false,
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

async fn run_audits(args: &CliArgs, ports: AuditPorts, adapter: &'static str) -> Result<RunReport> {
    let audit = TenantIsolationAudit::new(ports);
    let standard = audit
        .run(&TenantFixture::standard().wrap_err("building standard fixture")?)
        .await;

    let load = if args.skip_load {
        None
    } else {
        let fixture = TenantFixture::synthetic(args.tenants, args.rows, args.seed)
            .wrap_err("building synthetic fixture")?;
        Some(
            audit
                .load_smoke(&fixture, Duration::from_millis(args.budget_ms))
                .await,
        )
    };

    let unauthenticated = match args.probe_url.as_deref() {
        Some(url) => Some(probe(url).await?),
        None => None,
    };

    Ok(RunReport {
        adapter,
        standard,
        load,
        unauthenticated,
        passed: false,
    }
    .finish())
}

async fn async_main(args: CliArgs) -> Result<RunReport> {
    let database_url = args
        .database_url
        .clone()
        .or_else(|| std::env::var("MINDTRACK_DATABASE_URL").ok());

    let Some(url) = database_url else {
        warn!("no database configured; auditing the in-memory adapter");
        return run_audits(&args, memory_ports(), "memory").await;
    };

    let schema = args.schema.as_deref();
    let pool = connect(&url, schema).await?;
    let report = run_audits(&args, diesel_ports(&pool), "postgres").await;
    drop(pool);
    if let Some(schema) = schema {
        drop_schema(&url, schema)
            .await
            .wrap_err_with(|| format!("dropping schema {schema}"))?;
        info!(schema, "throwaway schema dropped");
    }
    report
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("creating Tokio runtime")?;
    let report = runtime.block_on(async_main(args))?;

    let json = serde_json::to_string_pretty(&report).wrap_err("serialising report")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").wrap_err("writing report")?;

    if report.passed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
