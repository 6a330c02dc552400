//! Account registration and login backed by the user repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{LoginService, UserAccount, UserRepository};
use crate::domain::{Error, LoginCredentials, PasswordDigest, Registration, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// [`LoginService`] implementation hashing passwords with Argon2id.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    /// Create a service over the given user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

/// Run a CPU-heavy closure off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| Error::internal(format!("password task failed: {err}")))
}

#[async_trait]
impl LoginService for AccountService {
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        if self.users.find_by_email(registration.email()).await?.is_some() {
            return Err(Error::conflict("an account with this email already exists"));
        }

        let password = registration.secret();
        let digest = run_blocking(move || PasswordDigest::hash(&password))
            .await?
            .map_err(|err| Error::internal(err.to_string()))?;

        let user = User::new(
            UserId::random(),
            registration.email().clone(),
            registration.display_name().clone(),
        );
        let account = UserAccount {
            user: user.clone(),
            password_digest: digest,
        };
        self.users.insert(&account).await?;
        info!(user_id = %user.id(), "account registered");
        Ok(user)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let account = self.users.find_by_email(credentials.email()).await?;

        // Unknown emails still pay for one Argon2 verification.
        let digest = match &account {
            Some(account) => Some(account.password_digest.clone()),
            None => PasswordDigest::decoy().cloned(),
        };
        let password = credentials.secret();
        let verified =
            run_blocking(move || digest.is_some_and(|digest| digest.verify(&password))).await?;

        match account {
            Some(account) if verified => Ok(account.user.id().clone()),
            Some(account) => {
                warn!(user_id = %account.user.id(), "login rejected");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
            None => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }
}
