//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! The persistence layer follows these principles:
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Async-safe pooling**: Connections are managed via `bb8` pools with
//!   proper async integration through `diesel-async`.
//! - **Strongly typed errors**: All database errors are mapped to domain
//!   persistence error types.
//!
//! # Example
//!
//! ```no_run
//! use mindtrack::outbound::persistence::{
//!     DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/mindtrack";
//! run_pending_migrations(url, None).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let repo = DieselUserRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

pub(crate) mod diesel_helpers;
mod diesel_community_repository;
mod diesel_journal_repository;
mod diesel_settings_repository;
mod diesel_tenant_data_repository;
mod diesel_user_overview_query;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_community_repository::DieselCommunityRepository;
pub use diesel_journal_repository::{
    DieselGoalRepository, DieselInsightRepository, DieselMoodEntryRepository,
};
pub use diesel_settings_repository::DieselSettingsRepository;
pub use diesel_tenant_data_repository::DieselTenantDataRepository;
pub use diesel_user_overview_query::DieselUserOverviewQuery;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, drop_schema, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, validate_schema_name};
