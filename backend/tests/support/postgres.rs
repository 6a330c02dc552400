//! PostgreSQL for integration tests.
//!
//! Each test boots an embedded cluster through `pg-embed-setup-unpriv`
//! unless `MINDTRACK_TEST_DATABASE_URL` points the suites at an existing
//! server. Either way the test works inside a freshly migrated schema that is
//! dropped afterwards.
//!
//! `pg-embed-setup-unpriv` installs into `/var/tmp` by default. When
//! `PG_RUNTIME_DIR` or `PG_DATA_DIR` is missing, both are pointed at unique
//! directories under the target directory for the duration of the bootstrap.
//!
//! Setup failures fail the test unless `SKIP_TEST_CLUSTER` is truthy.

use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use mindtrack::outbound::persistence::{
    DbPool, PoolConfig, drop_schema, run_pending_migrations,
};
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Environment variable naming an external test database.
pub const TEST_DATABASE_URL: &str = "MINDTRACK_TEST_DATABASE_URL";

/// Database every fresh cluster carries; test schemas are created inside it.
const MAINTENANCE_DATABASE: &str = "postgres";

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 500;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a `SKIP-TEST-CLUSTER` marker when allowed, otherwise fail loudly.
#[expect(clippy::print_stderr, reason = "skip markers belong in the test log")]
pub fn handle_cluster_setup_failure<T>(reason: impl Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn pg_embed_target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn unique_pg_embed_dirs() -> std::io::Result<(String, String)> {
    let base = pg_embed_target_dir().join(format!(
        "mindtrack-{}-{}",
        std::process::id(),
        Uuid::new_v4().simple()
    ));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((
        runtime_dir.to_string_lossy().into_owned(),
        data_dir.to_string_lossy().into_owned(),
    ))
}

fn is_transient_error(message: &str) -> bool {
    const PATTERNS: [&str; 7] = [
        "error decoding response body",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "temporarily unavailable",
        "dns error",
    ];
    let lower = message.to_lowercase();
    PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Boot an embedded cluster, retrying transient download failures.
#[expect(clippy::print_stderr, reason = "retry notices belong in the test log")]
fn embedded_cluster() -> Result<TestCluster, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    let needs_override =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();
    let _env = if needs_override {
        let (runtime_dir, data_dir) = unique_pg_embed_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir)),
            ("PG_DATA_DIR", Some(data_dir)),
        ]))
    } else {
        None
    };

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt == MAX_RETRIES || !is_transient_error(&last_error) {
                    break;
                }
                let delay = Duration::from_millis(RETRY_DELAY_MS << attempt);
                eprintln!(
                    "pg-embed: transient error on attempt {}/{}, retrying in {delay:?}: {last_error}",
                    attempt + 1,
                    MAX_RETRIES + 1,
                );
                std::thread::sleep(delay);
            }
        }
    }
    Err(last_error)
}

/// A migrated throwaway schema, a pool pinned to it, and the runtime that
/// drives both.
///
/// Fields drop in declaration order, so the pool goes before its runtime and
/// the embedded cluster stops last.
pub struct TestDatabase {
    pub pool: DbPool,
    runtime: Runtime,
    url: String,
    schema: String,
    _cluster: Option<TestCluster>,
}

impl TestDatabase {
    /// Provision a schema on the external server or a fresh embedded cluster.
    ///
    /// Returns `None` only when setup failed and `SKIP_TEST_CLUSTER` allows
    /// skipping.
    pub fn provision() -> Option<Self> {
        let (url, cluster) = match std::env::var(TEST_DATABASE_URL) {
            Ok(url) => (url, None),
            Err(_) => match embedded_cluster() {
                Ok(cluster) => {
                    let url = cluster.connection().database_url(MAINTENANCE_DATABASE);
                    (url, Some(cluster))
                }
                Err(reason) => return handle_cluster_setup_failure(reason),
            },
        };
        match Self::prepare(url, cluster) {
            Ok(database) => Some(database),
            Err(reason) => handle_cluster_setup_failure(reason),
        }
    }

    fn prepare(url: String, cluster: Option<TestCluster>) -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let schema = format!("mindtrack_test_{}", Uuid::new_v4().simple());
        let pool = runtime.block_on(async {
            run_pending_migrations(&url, Some(&schema))
                .await
                .map_err(|err| err.to_string())?;
            DbPool::new(PoolConfig::new(&url).with_schema(&schema).with_max_size(4))
                .await
                .map_err(|err| err.to_string())
        })?;
        Ok(Self {
            pool,
            runtime,
            url,
            schema,
            _cluster: cluster,
        })
    }

    /// Drive `future` to completion on this database's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Drop the schema and everything in it.
    pub fn teardown(self) {
        let Self {
            pool,
            runtime,
            url,
            schema,
            _cluster,
        } = self;
        drop(pool);
        runtime
            .block_on(drop_schema(&url, &schema))
            .expect("schema drops");
    }
}
