//! Notification and privacy settings with defaults for unsaved users.

use std::sync::Arc;

use crate::domain::ports::{NotificationSettingsRepository, PrivacySettingsRepository};
use crate::domain::{Error, NotificationSettings, PrivacySettings, UserId};

/// Reads and writes per-user settings.
#[derive(Clone)]
pub struct SettingsService {
    notifications: Arc<dyn NotificationSettingsRepository>,
    privacy: Arc<dyn PrivacySettingsRepository>,
}

impl SettingsService {
    /// Create the service.
    pub fn new(
        notifications: Arc<dyn NotificationSettingsRepository>,
        privacy: Arc<dyn PrivacySettingsRepository>,
    ) -> Self {
        Self {
            notifications,
            privacy,
        }
    }

    /// Saved notification settings or the defaults.
    pub async fn notifications(&self, user_id: &UserId) -> Result<NotificationSettings, Error> {
        Ok(self
            .notifications
            .find(user_id)
            .await?
            .unwrap_or_else(|| NotificationSettings::defaults_for(user_id.clone())))
    }

    /// Replace notification settings. The owner always comes from `user_id`.
    pub async fn save_notifications(
        &self,
        user_id: &UserId,
        mut settings: NotificationSettings,
    ) -> Result<NotificationSettings, Error> {
        settings.user_id = user_id.clone();
        self.notifications.save(&settings).await?;
        Ok(settings)
    }

    /// Saved privacy settings or the defaults.
    pub async fn privacy(&self, user_id: &UserId) -> Result<PrivacySettings, Error> {
        Ok(self
            .privacy
            .find(user_id)
            .await?
            .unwrap_or_else(|| PrivacySettings::defaults_for(user_id.clone())))
    }

    /// Replace privacy settings. The owner always comes from `user_id`.
    pub async fn save_privacy(
        &self,
        user_id: &UserId,
        mut settings: PrivacySettings,
    ) -> Result<PrivacySettings, Error> {
        settings.user_id = user_id.clone();
        self.privacy.save(&settings).await?;
        Ok(settings)
    }
}
