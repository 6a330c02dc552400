//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    GoalRepository, InsightRepository, LoginService, MoodEntryRepository,
    NotificationSettingsRepository, PrivacySettingsRepository, SupportGroupRepository,
    TenantDataRepository, TherapistRepository, UserOverviewQuery, UserRepository,
};
use crate::domain::{
    CommunityService, GoalService, JournalService, PrivacyService, SettingsService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserRepository>,
    pub moods: Arc<dyn MoodEntryRepository>,
    pub insights: Arc<dyn InsightRepository>,
    pub goals: Arc<dyn GoalRepository>,
    pub overview: Arc<dyn UserOverviewQuery>,
    pub tenant_data: Arc<dyn TenantDataRepository>,
    pub notifications: Arc<dyn NotificationSettingsRepository>,
    pub privacy: Arc<dyn PrivacySettingsRepository>,
    pub support_groups: Arc<dyn SupportGroupRepository>,
    pub therapists: Arc<dyn TherapistRepository>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserRepository>,
    pub journal: JournalService,
    pub goals: GoalService,
    pub settings: SettingsService,
    pub privacy: PrivacyService,
    pub community: CommunityService,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire the domain services over the supplied ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mindtrack::domain::AccountService;
    /// use mindtrack::inbound::http::state::{HttpState, HttpStatePorts};
    /// use mindtrack::outbound::memory::InMemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let ports = HttpStatePorts {
    ///     login: Arc::new(AccountService::new(store.clone())),
    ///     users: store.clone(),
    ///     moods: store.clone(),
    ///     insights: store.clone(),
    ///     goals: store.clone(),
    ///     overview: store.clone(),
    ///     tenant_data: store.clone(),
    ///     notifications: store.clone(),
    ///     privacy: store.clone(),
    ///     support_groups: store.clone(),
    ///     therapists: store,
    ///     clock: Arc::new(DefaultClock),
    /// };
    /// let state = HttpState::new(ports);
    /// let _journal = state.journal.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            moods,
            insights,
            goals,
            overview,
            tenant_data,
            notifications,
            privacy,
            support_groups,
            therapists,
            clock,
        } = ports;
        let settings = SettingsService::new(notifications, privacy);
        Self {
            login,
            users,
            journal: JournalService::new(moods, insights, overview.clone(), clock.clone()),
            goals: GoalService::new(goals, clock.clone()),
            privacy: PrivacyService::new(overview, tenant_data, settings.clone(), clock.clone()),
            settings,
            community: CommunityService::new(support_groups, therapists, clock),
        }
    }
}
