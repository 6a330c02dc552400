//! Ports for per-user notification and privacy settings.
use async_trait::async_trait;

use crate::domain::{NotificationSettings, PrivacySettings, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by settings repositories.
    pub enum SettingsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "settings repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "settings repository query failed: {message}",
    }
}

/// Storage for [`NotificationSettings`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSettingsRepository: Send + Sync {
    /// Saved settings, or `None` when the user never saved any.
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<NotificationSettings>, SettingsRepositoryError>;

    /// Insert or replace the user's settings.
    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsRepositoryError>;
}

/// Storage for [`PrivacySettings`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrivacySettingsRepository: Send + Sync {
    /// Saved settings, or `None` when the user never saved any.
    async fn find(&self, user_id: &UserId)
    -> Result<Option<PrivacySettings>, SettingsRepositoryError>;

    /// Insert or replace the user's settings.
    async fn save(&self, settings: &PrivacySettings) -> Result<(), SettingsRepositoryError>;
}

impl From<SettingsRepositoryError> for crate::domain::Error {
    fn from(error: SettingsRepositoryError) -> Self {
        match error {
            SettingsRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("settings store unavailable: {message}"))
            }
            SettingsRepositoryError::Query { message } => {
                Self::internal(format!("settings store error: {message}"))
            }
        }
    }
}
