//! Accounts and per-user settings.

use async_trait::async_trait;

use crate::domain::ports::{
    NotificationSettingsRepository, PrivacySettingsRepository, SettingsRepositoryError,
    UserAccount, UserPersistenceError, UserRepository,
};
use crate::domain::{Email, NotificationSettings, PrivacySettings, User, UserId};

use super::InMemoryStore;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::connection)?;
        if state
            .users
            .iter()
            .any(|a| a.user.email() == account.user.email())
        {
            return Err(UserPersistenceError::duplicate_email(
                account.user.email().to_string(),
            ));
        }
        if state.has_user(account.user.id()) {
            return Err(UserPersistenceError::query(format!(
                "user {} already exists",
                account.user.id()
            )));
        }
        state.users.push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state
            .users
            .iter()
            .find(|a| a.user.id() == id)
            .map(|a| a.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(state.users.iter().find(|a| a.user.email() == email).cloned())
    }
}

fn require_user(store: &super::StoreState, user_id: &UserId) -> Result<(), SettingsRepositoryError> {
    if store.has_user(user_id) {
        Ok(())
    } else {
        Err(SettingsRepositoryError::query(format!(
            "settings reference unknown user {user_id}"
        )))
    }
}

#[async_trait]
impl NotificationSettingsRepository for InMemoryStore {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<NotificationSettings>, SettingsRepositoryError> {
        let state = self.lock().map_err(SettingsRepositoryError::connection)?;
        Ok(state.notification_settings.get(user_id).cloned())
    }

    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsRepositoryError> {
        let mut state = self.lock().map_err(SettingsRepositoryError::connection)?;
        require_user(&state, &settings.user_id)?;
        state
            .notification_settings
            .insert(settings.user_id.clone(), settings.clone());
        Ok(())
    }
}

#[async_trait]
impl PrivacySettingsRepository for InMemoryStore {
    async fn find(&self, user_id: &UserId) -> Result<Option<PrivacySettings>, SettingsRepositoryError> {
        let state = self.lock().map_err(SettingsRepositoryError::connection)?;
        Ok(state.privacy_settings.get(user_id).cloned())
    }

    async fn save(&self, settings: &PrivacySettings) -> Result<(), SettingsRepositoryError> {
        let mut state = self.lock().map_err(SettingsRepositoryError::connection)?;
        require_user(&state, &settings.user_id)?;
        state
            .privacy_settings
            .insert(settings.user_id.clone(), settings.clone());
        Ok(())
    }
}
