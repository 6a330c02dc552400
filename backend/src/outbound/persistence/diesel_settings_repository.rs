//! PostgreSQL adapters for notification and privacy settings.
//!
//! Saves are upserts keyed on `user_id`, so a user has at most one row per
//! settings table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    NotificationSettingsRepository, PrivacySettingsRepository, SettingsRepositoryError,
};
use crate::domain::{NotificationSettings, PrivacySettings, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NotificationSettingsRow, PrivacySettingsRow};
use super::pool::DbPool;
use super::schema::{notification_settings, privacy_settings};

/// Diesel-backed settings repository serving both settings ports.
#[derive(Clone)]
pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSettingsRepository for DieselSettingsRepository {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<NotificationSettings>, SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = notification_settings::table
            .find(*user_id.as_uuid())
            .select(NotificationSettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(NotificationSettings::from))
    }

    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NotificationSettingsRow::from(settings);
        diesel::insert_into(notification_settings::table)
            .values(&row)
            .on_conflict(notification_settings::user_id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl PrivacySettingsRepository for DieselSettingsRepository {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PrivacySettings>, SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = privacy_settings::table
            .find(*user_id.as_uuid())
            .select(PrivacySettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PrivacySettingsRow::into_domain)
            .transpose()
            .map_err(SettingsRepositoryError::query)
    }

    async fn save(&self, settings: &PrivacySettings) -> Result<(), SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = PrivacySettingsRow::from(settings);
        diesel::insert_into(privacy_settings::table)
            .values(&row)
            .on_conflict(privacy_settings::user_id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
