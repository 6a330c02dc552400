//! Port abstraction for user account persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, PasswordDigest, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// A user together with their stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Public profile.
    pub user: User,
    /// Argon2id digest of the password.
    pub password_digest: PasswordDigest,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` when the email is taken.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account, including its digest, by login email.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;
}

impl From<UserPersistenceError> for crate::domain::Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Self::internal(format!("user store error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { .. } => {
                Self::conflict("an account with this email already exists")
            }
        }
    }
}
