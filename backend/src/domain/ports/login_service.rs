//! Driving port for registration and login use-cases.
//!
//! Inbound adapters call it to create accounts and authenticate credentials
//! without importing the backing infrastructure, so HTTP handler tests can
//! substitute a mock.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

/// Domain use-case port for accounts and authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Create an account. Returns `409 Conflict` semantics when the email is taken.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;

    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
