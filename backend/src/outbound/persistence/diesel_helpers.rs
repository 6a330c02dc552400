//! Shared helpers for Diesel repository implementations.
//!
//! Every port error in this crate has `connection` and `query` constructors.
//! [`StoreError`] abstracts over them so pool and Diesel failures map the
//! same way in every adapter.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::{
    CommunityRepositoryError, SettingsRepositoryError, TenantDataError, UserPersistenceError,
};

use super::pool::PoolError;

/// Port errors that distinguish connection failures from query failures.
pub(crate) trait StoreError: Sized {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;
}

macro_rules! impl_store_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StoreError for $ty {
                fn connection(message: String) -> Self {
                    <$ty>::connection(message)
                }

                fn query(message: String) -> Self {
                    <$ty>::query(message)
                }
            }
        )*
    };
}

impl_store_error!(
    CommunityRepositoryError,
    SettingsRepositoryError,
    TenantDataError,
    UserPersistenceError,
);

/// Map pool errors to the port's connection variant.
pub(crate) fn map_pool_error<E: StoreError>(error: PoolError) -> E {
    E::connection(error.into_message())
}

/// Map Diesel errors to the port's query or connection variant.
///
/// Database messages are logged at debug level and never returned, so
/// constraint names and SQL fragments stay out of API responses.
pub(crate) fn map_diesel_error<E: StoreError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => E::query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            warn!(
                constraint = ?info.constraint_name(),
                "write rejected by foreign key"
            );
            E::query("row references unknown user or record".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            E::query("duplicate key".to_owned())
        }
        _ => E::query("database error".to_owned()),
    }
}

/// Whether `error` is a unique constraint violation on `constraint`.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Convert an affected-row count for reporting.
pub(crate) fn to_count(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

/// Convert a `COUNT(*)` result for reporting.
pub(crate) fn from_sql_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
