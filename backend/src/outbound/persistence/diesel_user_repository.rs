//! PostgreSQL-backed `UserRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserAccount, UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId};

use super::diesel_helpers::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err, EMAIL_CONSTRAINT) {
                    UserPersistenceError::duplicate_email(account.user.email().to_string())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_user)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_account)
            .transpose()
            .map_err(UserPersistenceError::query)
    }
}
