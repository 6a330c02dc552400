//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod community_repository;
mod goal_repository;
mod insight_repository;
mod login_service;
mod mood_entry_repository;
mod settings_repository;
mod tenant_data;
mod user_overview_query;
mod user_repository;

#[cfg(test)]
pub use community_repository::{MockSupportGroupRepository, MockTherapistRepository};
pub use community_repository::{
    CommunityRepositoryError, SupportGroupRepository, TherapistRepository,
};
#[cfg(test)]
pub use goal_repository::MockGoalRepository;
pub use goal_repository::GoalRepository;
#[cfg(test)]
pub use insight_repository::MockInsightRepository;
pub use insight_repository::InsightRepository;
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use mood_entry_repository::MockMoodEntryRepository;
pub use mood_entry_repository::MoodEntryRepository;
#[cfg(test)]
pub use settings_repository::{
    MockNotificationSettingsRepository, MockPrivacySettingsRepository,
};
pub use settings_repository::{
    NotificationSettingsRepository, PrivacySettingsRepository, SettingsRepositoryError,
};
#[cfg(test)]
pub use tenant_data::MockTenantDataRepository;
pub use tenant_data::{
    ListOptions, PurgeScope, PurgeSummary, SortOrder, TenantDataError, TenantDataRepository,
    TenantSeed,
};
#[cfg(test)]
pub use user_overview_query::MockUserOverviewQuery;
pub use user_overview_query::{UserOverview, UserOverviewQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserAccount, UserPersistenceError, UserRepository};
