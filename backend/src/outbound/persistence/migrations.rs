//! Embedded schema migrations.
//!
//! Diesel's migration harness is synchronous, so migrations run through
//! `diesel-async`'s connection wrapper on a blocking thread.

use diesel::Connection;
use diesel::connection::SimpleConnection;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use super::pool::{search_path_statement, validate_schema_name};

/// Migrations compiled into the binary from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The schema name was rejected before connecting.
    #[error("invalid schema name `{schema}`")]
    InvalidSchema { schema: String },
    /// Could not open the migration connection.
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply every pending migration and return how many ran.
///
/// With `schema` set, the schema is created when missing and both the
/// migrations and Diesel's bookkeeping table live inside it.
///
/// # Errors
///
/// Returns [`MigrationError`] when the connection or any migration fails.
pub async fn run_pending_migrations(
    database_url: &str,
    schema: Option<&str>,
) -> Result<usize, MigrationError> {
    let setup = match schema {
        Some(name) => {
            validate_schema_name(name).map_err(|_| MigrationError::InvalidSchema {
                schema: name.to_owned(),
            })?;
            Some(format!(
                "CREATE SCHEMA IF NOT EXISTS \"{name}\"; {}",
                search_path_statement(name)
            ))
        }
        None => None,
    };
    let url = database_url.to_owned();

    let applied = tokio::task::spawn_blocking(move || -> Result<usize, MigrationError> {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url).map_err(
            |err| MigrationError::Connect {
                message: err.to_string(),
            },
        )?;
        if let Some(statement) = setup {
            conn.batch_execute(&statement)
                .map_err(|err| MigrationError::Connect {
                    message: err.to_string(),
                })?;
        }
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| MigrationError::Apply {
                message: err.to_string(),
            })
    })
    .await
    .map_err(|err| MigrationError::Apply {
        message: err.to_string(),
    })??;

    info!(applied, schema = schema.unwrap_or("public"), "database migrations applied");
    Ok(applied)
}

/// Drop a throwaway schema and everything in it.
///
/// # Errors
///
/// Returns [`MigrationError`] when the schema name is invalid or the drop
/// fails.
pub async fn drop_schema(database_url: &str, schema: &str) -> Result<(), MigrationError> {
    validate_schema_name(schema).map_err(|_| MigrationError::InvalidSchema {
        schema: schema.to_owned(),
    })?;
    let url = database_url.to_owned();
    let statement = format!("DROP SCHEMA IF EXISTS \"{schema}\" CASCADE");

    tokio::task::spawn_blocking(move || -> Result<(), MigrationError> {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url).map_err(
            |err| MigrationError::Connect {
                message: err.to_string(),
            },
        )?;
        conn.batch_execute(&statement)
            .map_err(|err| MigrationError::Apply {
                message: err.to_string(),
            })
    })
    .await
    .map_err(|err| MigrationError::Apply {
        message: err.to_string(),
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unsafe_schema_before_connecting() {
        let err = run_pending_migrations("postgres://localhost/unused", Some("bad name"))
            .await
            .expect_err("invalid schema");
        assert_eq!(
            err,
            MigrationError::InvalidSchema {
                schema: "bad name".to_owned()
            }
        );

        let err = drop_schema("postgres://localhost/unused", "Robert'); --")
            .await
            .expect_err("invalid schema");
        assert!(matches!(err, MigrationError::InvalidSchema { .. }));
    }
}
