//! Builders for HTTP state over PostgreSQL or the in-memory store.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use mindtrack::domain::AccountService;
use mindtrack::inbound::http::state::{HttpState, HttpStatePorts};
use mindtrack::outbound::memory::InMemoryStore;
use mindtrack::outbound::persistence::{
    DbPool, DieselCommunityRepository, DieselGoalRepository, DieselInsightRepository,
    DieselMoodEntryRepository, DieselSettingsRepository, DieselTenantDataRepository,
    DieselUserOverviewQuery, DieselUserRepository,
};

use super::ServerConfig;

fn diesel_ports(pool: &DbPool) -> HttpStatePorts {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let settings = Arc::new(DieselSettingsRepository::new(pool.clone()));
    let community = Arc::new(DieselCommunityRepository::new(pool.clone()));
    HttpStatePorts {
        login: Arc::new(AccountService::new(users.clone())),
        users,
        moods: Arc::new(DieselMoodEntryRepository::new(pool.clone())),
        insights: Arc::new(DieselInsightRepository::new(pool.clone())),
        goals: Arc::new(DieselGoalRepository::new(pool.clone())),
        overview: Arc::new(DieselUserOverviewQuery::new(pool.clone())),
        tenant_data: Arc::new(DieselTenantDataRepository::new(pool.clone())),
        notifications: settings.clone(),
        privacy: settings,
        support_groups: community.clone(),
        therapists: community,
        clock: Arc::new(DefaultClock),
    }
}

fn memory_ports(store: InMemoryStore) -> HttpStatePorts {
    let store = Arc::new(store);
    HttpStatePorts {
        login: Arc::new(AccountService::new(store.clone())),
        users: store.clone(),
        moods: store.clone(),
        insights: store.clone(),
        goals: store.clone(),
        overview: store.clone(),
        tenant_data: store.clone(),
        notifications: store.clone(),
        privacy: store.clone(),
        support_groups: store.clone(),
        therapists: store,
        clock: Arc::new(DefaultClock),
    }
}

/// Build HTTP state from the configured adapters.
///
/// Without a pool every port is served by one shared [`InMemoryStore`], so
/// data lives only as long as the process.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => {
            info!(adapter = "postgres", "storage adapters configured");
            diesel_ports(pool)
        }
        None => {
            warn!(
                adapter = "memory",
                "no database configured; data will not survive a restart"
            );
            memory_ports(InMemoryStore::new())
        }
    };
    web::Data::new(HttpState::new(ports))
}
