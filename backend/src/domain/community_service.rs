//! Support group membership and therapist contact requests.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{SupportGroupRepository, TherapistRepository};
use crate::domain::{
    ContactRequest, Error, PreferredContact, SupportGroup, Therapist, UserId,
};

/// Use-cases for the community pages.
#[derive(Clone)]
pub struct CommunityService {
    groups: Arc<dyn SupportGroupRepository>,
    therapists: Arc<dyn TherapistRepository>,
    clock: Arc<dyn Clock>,
}

impl CommunityService {
    /// Create the service.
    pub fn new(
        groups: Arc<dyn SupportGroupRepository>,
        therapists: Arc<dyn TherapistRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            groups,
            therapists,
            clock,
        }
    }

    /// Every support group.
    pub async fn support_groups(&self) -> Result<Vec<SupportGroup>, Error> {
        Ok(self.groups.list().await?)
    }

    /// Groups the user belongs to.
    pub async fn my_support_groups(&self, user_id: &UserId) -> Result<Vec<SupportGroup>, Error> {
        Ok(self.groups.list_for_member(user_id).await?)
    }

    /// Join a group; full groups and repeat joins are conflicts.
    pub async fn join(&self, user_id: &UserId, group_id: Uuid) -> Result<SupportGroup, Error> {
        let group = self.groups.join(user_id, group_id).await?;
        info!(user_id = %user_id, group_id = %group_id, "joined support group");
        Ok(group)
    }

    /// Leave a group; leaving a group the user is not in is `not_found`.
    pub async fn leave(&self, user_id: &UserId, group_id: Uuid) -> Result<SupportGroup, Error> {
        let group = self.groups.leave(user_id, group_id).await?;
        info!(user_id = %user_id, group_id = %group_id, "left support group");
        Ok(group)
    }

    /// Therapist directory.
    pub async fn therapists(&self) -> Result<Vec<Therapist>, Error> {
        Ok(self.therapists.list().await?)
    }

    /// Ask a therapist to get in touch.
    pub async fn request_contact(
        &self,
        user_id: &UserId,
        therapist_id: Uuid,
        message: &str,
        preferred_contact: PreferredContact,
    ) -> Result<ContactRequest, Error> {
        let therapist = self
            .therapists
            .find(therapist_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("therapist {therapist_id} not found")))?;
        if !therapist.accepting_clients {
            return Err(Error::conflict(format!(
                "{} is not accepting new clients",
                therapist.name
            )));
        }
        let request = ContactRequest::try_new(
            user_id.clone(),
            therapist_id,
            message,
            preferred_contact,
            self.clock.utc(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.therapists.insert_contact_request(&request).await?;
        info!(user_id = %user_id, therapist_id = %therapist_id, "contact request submitted");
        Ok(request)
    }

    /// Contact requests the user has made.
    pub async fn my_contact_requests(&self, user_id: &UserId) -> Result<Vec<ContactRequest>, Error> {
        Ok(self.therapists.list_contact_requests(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        CommunityRepositoryError, MockSupportGroupRepository, MockTherapistRepository,
    };
    use crate::domain::{ErrorCode, starter_therapists};
    use chrono::Utc;
    use mockable::MockClock;
    use rstest::rstest;

    fn service(groups: MockSupportGroupRepository, therapists: MockTherapistRepository) -> CommunityService {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(Utc::now);
        CommunityService::new(Arc::new(groups), Arc::new(therapists), Arc::new(clock))
    }

    #[rstest]
    #[case(CommunityRepositoryError::group_full(Uuid::nil()), ErrorCode::Conflict)]
    #[case(CommunityRepositoryError::already_member(Uuid::nil()), ErrorCode::Conflict)]
    #[case(CommunityRepositoryError::not_found(Uuid::nil()), ErrorCode::NotFound)]
    #[tokio::test]
    async fn join_maps_repository_refusals(
        #[case] refusal: CommunityRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut groups = MockSupportGroupRepository::new();
        groups.expect_join().return_once(move |_, _| Err(refusal));

        let err = service(groups, MockTherapistRepository::new())
            .join(&UserId::random(), Uuid::nil())
            .await
            .expect_err("refused");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn contact_unknown_therapist_is_not_found() {
        let mut therapists = MockTherapistRepository::new();
        therapists.expect_find().return_once(|_| Ok(None));
        therapists.expect_insert_contact_request().never();

        let err = service(MockSupportGroupRepository::new(), therapists)
            .request_contact(&UserId::random(), Uuid::new_v4(), "hello", PreferredContact::Email)
            .await
            .expect_err("unknown");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn contact_closed_practice_is_conflict() {
        let closed = starter_therapists()
            .into_iter()
            .find(|t| !t.accepting_clients)
            .expect("closed practice");
        let id = closed.id;
        let mut therapists = MockTherapistRepository::new();
        therapists.expect_find().return_once(move |_| Ok(Some(closed)));
        therapists.expect_insert_contact_request().never();

        let err = service(MockSupportGroupRepository::new(), therapists)
            .request_contact(&UserId::random(), id, "hello", PreferredContact::Video)
            .await
            .expect_err("closed");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn contact_blank_message_is_invalid() {
        let open = starter_therapists().remove(0);
        let id = open.id;
        let mut therapists = MockTherapistRepository::new();
        therapists.expect_find().return_once(move |_| Ok(Some(open)));

        let err = service(MockSupportGroupRepository::new(), therapists)
            .request_contact(&UserId::random(), id, "   ", PreferredContact::Phone)
            .await
            .expect_err("blank");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn contact_request_is_stored_for_caller() {
        let open = starter_therapists().remove(0);
        let id = open.id;
        let user = UserId::random();
        let owner = user.clone();
        let mut therapists = MockTherapistRepository::new();
        therapists.expect_find().return_once(move |_| Ok(Some(open)));
        therapists
            .expect_insert_contact_request()
            .withf(move |request| request.user_id == owner && request.message == "hi there")
            .times(1)
            .return_once(|_| Ok(()));

        let request = service(MockSupportGroupRepository::new(), therapists)
            .request_contact(&user, id, " hi there ", PreferredContact::Email)
            .await
            .expect("stored");
        assert_eq!(request.therapist_id, id);
    }
}
