//! Support groups, memberships and therapist contact requests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{CommunityRepositoryError, SupportGroupRepository, TherapistRepository};
use crate::domain::{ContactRequest, SupportGroup, Therapist, UserId};

use super::InMemoryStore;

fn by_name<T>(rows: &mut [T], name: impl Fn(&T) -> &str) {
    rows.sort_by(|a, b| name(a).cmp(name(b)));
}

#[async_trait]
impl SupportGroupRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<SupportGroup>, CommunityRepositoryError> {
        let state = self.lock().map_err(CommunityRepositoryError::connection)?;
        let mut groups: Vec<SupportGroup> = state
            .support_groups
            .iter()
            .map(|g| state.group_with_count(g))
            .collect();
        by_name(&mut groups, |g| g.name.as_str());
        Ok(groups)
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SupportGroup>, CommunityRepositoryError> {
        let state = self.lock().map_err(CommunityRepositoryError::connection)?;
        let mut groups: Vec<SupportGroup> = state
            .support_groups
            .iter()
            .filter(|g| state.memberships.contains(&(g.id, user_id.clone())))
            .map(|g| state.group_with_count(g))
            .collect();
        by_name(&mut groups, |g| g.name.as_str());
        Ok(groups)
    }

    async fn join(
        &self,
        user_id: &UserId,
        group_id: Uuid,
    ) -> Result<SupportGroup, CommunityRepositoryError> {
        let mut state = self.lock().map_err(CommunityRepositoryError::connection)?;
        let group = state
            .support_groups
            .iter()
            .find(|g| g.id == group_id)
            .map(|g| state.group_with_count(g))
            .ok_or_else(|| CommunityRepositoryError::not_found(group_id))?;
        if !state.has_user(user_id) {
            return Err(CommunityRepositoryError::query(format!(
                "membership references unknown user {user_id}"
            )));
        }
        let key = (group_id, user_id.clone());
        if state.memberships.contains(&key) {
            return Err(CommunityRepositoryError::already_member(group_id));
        }
        if !group.has_room() {
            return Err(CommunityRepositoryError::group_full(group_id));
        }
        state.memberships.insert(key);
        Ok(SupportGroup {
            member_count: group.member_count + 1,
            ..group
        })
    }

    async fn leave(
        &self,
        user_id: &UserId,
        group_id: Uuid,
    ) -> Result<SupportGroup, CommunityRepositoryError> {
        let mut state = self.lock().map_err(CommunityRepositoryError::connection)?;
        if !state.support_groups.iter().any(|g| g.id == group_id) {
            return Err(CommunityRepositoryError::not_found(group_id));
        }
        if !state.memberships.remove(&(group_id, user_id.clone())) {
            return Err(CommunityRepositoryError::not_member(group_id));
        }
        state
            .support_groups
            .iter()
            .find(|g| g.id == group_id)
            .map(|g| state.group_with_count(g))
            .ok_or_else(|| CommunityRepositoryError::not_found(group_id))
    }
}

#[async_trait]
impl TherapistRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Therapist>, CommunityRepositoryError> {
        let state = self.lock().map_err(CommunityRepositoryError::connection)?;
        let mut therapists = state.therapists.clone();
        by_name(&mut therapists, |t| t.name.as_str());
        Ok(therapists)
    }

    async fn find(&self, therapist_id: Uuid) -> Result<Option<Therapist>, CommunityRepositoryError> {
        let state = self.lock().map_err(CommunityRepositoryError::connection)?;
        Ok(state
            .therapists
            .iter()
            .find(|t| t.id == therapist_id)
            .cloned())
    }

    async fn insert_contact_request(
        &self,
        request: &ContactRequest,
    ) -> Result<(), CommunityRepositoryError> {
        let mut state = self.lock().map_err(CommunityRepositoryError::connection)?;
        if !state.therapists.iter().any(|t| t.id == request.therapist_id) {
            return Err(CommunityRepositoryError::not_found(request.therapist_id));
        }
        if !state.has_user(&request.user_id) {
            return Err(CommunityRepositoryError::query(format!(
                "contact request references unknown user {}",
                request.user_id
            )));
        }
        state.contact_requests.push(request.clone());
        Ok(())
    }

    async fn list_contact_requests(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ContactRequest>, CommunityRepositoryError> {
        let state = self.lock().map_err(CommunityRepositoryError::connection)?;
        let mut requests: Vec<ContactRequest> = state
            .contact_requests
            .iter()
            .filter(|r| r.user_id == *user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }
}
