//! Journal tables, relation loading, and bulk seed/purge.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    GoalRepository, InsightRepository, ListOptions, MoodEntryRepository, PurgeScope,
    PurgeSummary, SortOrder, TenantDataError, TenantDataRepository, TenantSeed, UserOverview,
    UserOverviewQuery,
};
use crate::domain::{Goal, Insight, MoodEntry, UserId};

use super::{InMemoryStore, StoreState, remove_for_user, select_for_user, to_count};

impl InMemoryStore {
    fn lock_tenant(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, TenantDataError> {
        self.lock().map_err(TenantDataError::connection)
    }
}

fn require_owner(state: &StoreState, table: &str, user_id: &UserId) -> Result<(), TenantDataError> {
    if state.has_user(user_id) {
        Ok(())
    } else {
        Err(TenantDataError::query(format!(
            "{table} row references unknown user {user_id}"
        )))
    }
}

fn require_unique(ids: impl Iterator<Item = Uuid>, table: &str) -> Result<(), TenantDataError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(TenantDataError::query(format!(
                "duplicate {table} id {id}"
            )));
        }
    }
    Ok(())
}

fn mood_key(entry: &MoodEntry) -> (chrono::DateTime<chrono::Utc>, Uuid) {
    (entry.recorded_at, entry.id)
}

fn insight_key(insight: &Insight) -> (chrono::DateTime<chrono::Utc>, Uuid) {
    (insight.created_at, insight.id)
}

fn goal_key(goal: &Goal) -> (chrono::DateTime<chrono::Utc>, Uuid) {
    (goal.created_at, goal.id)
}

#[async_trait]
impl MoodEntryRepository for InMemoryStore {
    async fn insert(&self, entry: &MoodEntry) -> Result<(), TenantDataError> {
        let mut state = self.lock_tenant()?;
        require_owner(&state, "mood_entries", &entry.user_id)?;
        require_unique(
            state.mood_entries.iter().map(|e| e.id).chain([entry.id]),
            "mood_entries",
        )?;
        state.mood_entries.push(entry.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<MoodEntry>, TenantDataError> {
        let state = self.lock_tenant()?;
        Ok(select_for_user(
            &state.mood_entries,
            user_id,
            |e| &e.user_id,
            mood_key,
            options,
        ))
    }

    async fn count_all(&self) -> Result<u64, TenantDataError> {
        Ok(to_count(self.lock_tenant()?.mood_entries.len()))
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError> {
        let mut state = self.lock_tenant()?;
        Ok(remove_for_user(&mut state.mood_entries, user_id, |e| &e.user_id))
    }
}

#[async_trait]
impl InsightRepository for InMemoryStore {
    async fn insert(&self, insight: &Insight) -> Result<(), TenantDataError> {
        let mut state = self.lock_tenant()?;
        require_owner(&state, "insights", &insight.user_id)?;
        require_unique(
            state.insights.iter().map(|i| i.id).chain([insight.id]),
            "insights",
        )?;
        state.insights.push(insight.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<Insight>, TenantDataError> {
        let state = self.lock_tenant()?;
        Ok(select_for_user(
            &state.insights,
            user_id,
            |i| &i.user_id,
            insight_key,
            options,
        ))
    }

    async fn count_all(&self) -> Result<u64, TenantDataError> {
        Ok(to_count(self.lock_tenant()?.insights.len()))
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError> {
        let mut state = self.lock_tenant()?;
        Ok(remove_for_user(&mut state.insights, user_id, |i| &i.user_id))
    }
}

#[async_trait]
impl GoalRepository for InMemoryStore {
    async fn insert(&self, goal: &Goal) -> Result<(), TenantDataError> {
        let mut state = self.lock_tenant()?;
        require_owner(&state, "goals", &goal.user_id)?;
        require_unique(state.goals.iter().map(|g| g.id).chain([goal.id]), "goals")?;
        state.goals.push(goal.clone());
        Ok(())
    }

    async fn find(&self, user_id: &UserId, goal_id: Uuid) -> Result<Option<Goal>, TenantDataError> {
        let state = self.lock_tenant()?;
        Ok(state
            .goals
            .iter()
            .find(|g| g.id == goal_id && g.user_id == *user_id)
            .cloned())
    }

    async fn update(&self, goal: &Goal) -> Result<bool, TenantDataError> {
        let mut state = self.lock_tenant()?;
        let Some(stored) = state
            .goals
            .iter_mut()
            .find(|g| g.id == goal.id && g.user_id == goal.user_id)
        else {
            return Ok(false);
        };
        stored.progress = goal.progress;
        stored.status = goal.status;
        stored.updated_at = goal.updated_at;
        Ok(true)
    }

    async fn delete(&self, user_id: &UserId, goal_id: Uuid) -> Result<bool, TenantDataError> {
        let mut state = self.lock_tenant()?;
        let before = state.goals.len();
        state
            .goals
            .retain(|g| !(g.id == goal_id && g.user_id == *user_id));
        Ok(state.goals.len() != before)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        options: ListOptions,
    ) -> Result<Vec<Goal>, TenantDataError> {
        let state = self.lock_tenant()?;
        Ok(select_for_user(
            &state.goals,
            user_id,
            |g| &g.user_id,
            goal_key,
            options,
        ))
    }

    async fn count_all(&self) -> Result<u64, TenantDataError> {
        Ok(to_count(self.lock_tenant()?.goals.len()))
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, TenantDataError> {
        let mut state = self.lock_tenant()?;
        Ok(remove_for_user(&mut state.goals, user_id, |g| &g.user_id))
    }
}

#[async_trait]
impl UserOverviewQuery for InMemoryStore {
    async fn fetch(&self, user_id: &UserId) -> Result<Option<UserOverview>, TenantDataError> {
        let state = self.lock_tenant()?;
        let Some(account) = state.users.iter().find(|a| a.user.id() == user_id) else {
            return Ok(None);
        };
        let newest = ListOptions::default().with_order(SortOrder::NewestFirst);
        Ok(Some(UserOverview {
            user: account.user.clone(),
            mood_entries: select_for_user(
                &state.mood_entries,
                user_id,
                |e| &e.user_id,
                mood_key,
                newest,
            ),
            insights: select_for_user(&state.insights, user_id, |i| &i.user_id, insight_key, newest),
            goals: select_for_user(&state.goals, user_id, |g| &g.user_id, goal_key, newest),
        }))
    }
}

/// Checks a seed against current state without mutating anything.
fn validate_seed(state: &StoreState, seed: &TenantSeed) -> Result<(), TenantDataError> {
    for account in &seed.users {
        let clash = state
            .users
            .iter()
            .chain(seed.users.iter().filter(|other| !std::ptr::eq(*other, account)))
            .any(|other| {
                other.user.id() == account.user.id() || other.user.email() == account.user.email()
            });
        if clash {
            return Err(TenantDataError::query(format!(
                "seed user {} clashes with an existing account",
                account.user.id()
            )));
        }
    }
    let known = |user_id: &UserId| {
        state.has_user(user_id) || seed.users.iter().any(|a| a.user.id() == user_id)
    };
    let owners = seed
        .mood_entries
        .iter()
        .map(|e| ("mood_entries", &e.user_id))
        .chain(seed.insights.iter().map(|i| ("insights", &i.user_id)))
        .chain(seed.goals.iter().map(|g| ("goals", &g.user_id)));
    for (table, owner) in owners {
        if !known(owner) {
            return Err(TenantDataError::query(format!(
                "{table} row references unknown user {owner}"
            )));
        }
    }
    require_unique(
        state
            .mood_entries
            .iter()
            .chain(&seed.mood_entries)
            .map(|e| e.id),
        "mood_entries",
    )?;
    require_unique(
        state.insights.iter().chain(&seed.insights).map(|i| i.id),
        "insights",
    )?;
    require_unique(state.goals.iter().chain(&seed.goals).map(|g| g.id), "goals")
}

#[async_trait]
impl TenantDataRepository for InMemoryStore {
    async fn seed(&self, seed: &TenantSeed) -> Result<(), TenantDataError> {
        let mut state = self.lock_tenant()?;
        validate_seed(&state, seed)?;
        state.users.extend(seed.users.iter().cloned());
        state.mood_entries.extend(seed.mood_entries.iter().cloned());
        state.insights.extend(seed.insights.iter().cloned());
        state.goals.extend(seed.goals.iter().cloned());
        Ok(())
    }

    async fn purge(
        &self,
        users: &[UserId],
        scope: PurgeScope,
    ) -> Result<PurgeSummary, TenantDataError> {
        let mut state = self.lock_tenant()?;
        let mut summary = PurgeSummary::default();
        for user_id in users {
            summary.mood_entries += remove_for_user(&mut state.mood_entries, user_id, |e| &e.user_id);
            summary.insights += remove_for_user(&mut state.insights, user_id, |i| &i.user_id);
            summary.goals += remove_for_user(&mut state.goals, user_id, |g| &g.user_id);
            if scope == PurgeScope::Everything {
                purge_account(&mut state, user_id, &mut summary);
            }
        }
        Ok(summary)
    }
}

/// Removes the account and everything else that references it.
fn purge_account(state: &mut StoreState, user_id: &UserId, summary: &mut PurgeSummary) {
    state.notification_settings.remove(user_id);
    state.privacy_settings.remove(user_id);
    state.memberships.retain(|(_, member)| member != user_id);
    state
        .contact_requests
        .retain(|request| request.user_id != *user_id);
    summary.users += remove_for_user(&mut state.users, user_id, |a| a.user.id());
}
