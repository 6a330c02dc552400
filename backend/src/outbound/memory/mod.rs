//! In-process adapter implementing every storage port.
//!
//! Used when no database URL is configured and by the default test suites.
//! All state lives behind one mutex; a multi-row operation such as a seed or
//! purge holds the lock for its whole duration, so it is observed atomically.
//! Foreign keys are emulated: dependent rows must reference a stored user and
//! a user row is only removed after its dependants.

mod community;
mod journal;
mod users;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{ListOptions, SortOrder, UserAccount};
use crate::domain::{
    ContactRequest, Goal, Insight, MoodEntry, NotificationSettings, PrivacySettings,
    SupportGroup, Therapist, UserId, starter_support_groups, starter_therapists,
};

#[derive(Debug, Default)]
struct StoreState {
    users: Vec<UserAccount>,
    mood_entries: Vec<MoodEntry>,
    insights: Vec<Insight>,
    goals: Vec<Goal>,
    notification_settings: HashMap<UserId, NotificationSettings>,
    privacy_settings: HashMap<UserId, PrivacySettings>,
    support_groups: Vec<SupportGroup>,
    memberships: BTreeSet<(Uuid, UserId)>,
    therapists: Vec<Therapist>,
    contact_requests: Vec<ContactRequest>,
}

impl StoreState {
    fn has_user(&self, user_id: &UserId) -> bool {
        self.users.iter().any(|account| account.user.id() == user_id)
    }

    /// Group with `member_count` derived from current memberships.
    fn group_with_count(&self, group: &SupportGroup) -> SupportGroup {
        let members = self
            .memberships
            .iter()
            .filter(|(group_id, _)| *group_id == group.id)
            .count();
        SupportGroup {
            member_count: i32::try_from(members).unwrap_or(i32::MAX),
            ..group.clone()
        }
    }
}

/// Shared in-memory store. Cloning yields another handle to the same data.
///
/// # Examples
/// ```
/// use mindtrack::outbound::memory::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// let other = store.clone();
/// assert!(store.same_store(&other));
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a store holding the starter support groups and therapists.
    pub fn new() -> Self {
        let state = StoreState {
            support_groups: starter_support_groups(),
            therapists: starter_therapists(),
            ..StoreState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Whether `other` is a handle to the same underlying data.
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

fn to_count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Rows owned by `user_id`, sorted by `(timestamp, id)` and limited.
fn select_for_user<T: Clone>(
    rows: &[T],
    user_id: &UserId,
    owner: impl Fn(&T) -> &UserId,
    key: impl Fn(&T) -> (DateTime<Utc>, Uuid),
    options: ListOptions,
) -> Vec<T> {
    let mut selected: Vec<T> = rows
        .iter()
        .filter(|row| owner(row) == user_id)
        .cloned()
        .collect();
    selected.sort_by_key(&key);
    if options.order == SortOrder::NewestFirst {
        selected.reverse();
    }
    if let Some(limit) = options.limit {
        selected.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    selected
}

/// Remove rows owned by `user_id`, returning how many were removed.
fn remove_for_user<T>(rows: &mut Vec<T>, user_id: &UserId, owner: impl Fn(&T) -> &UserId) -> u64 {
    let before = rows.len();
    rows.retain(|row| owner(row) != user_id);
    to_count(before - rows.len())
}
