//! Ports for support groups and the therapist directory.
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContactRequest, SupportGroup, Therapist, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by community repositories.
    pub enum CommunityRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "community repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "community repository query failed: {message}",
        /// Group or therapist does not exist.
        NotFound { id: Uuid } => "no community record with id {id}",
        /// Group has no free places.
        GroupFull { id: Uuid } => "support group {id} is full",
        /// User already belongs to the group.
        AlreadyMember { id: Uuid } => "already a member of support group {id}",
        /// User does not belong to the group.
        NotMember { id: Uuid } => "not a member of support group {id}",
    }
}

/// Support group catalogue and memberships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupportGroupRepository: Send + Sync {
    /// Every group, ordered by name.
    async fn list(&self) -> Result<Vec<SupportGroup>, CommunityRepositoryError>;

    /// Groups `user_id` belongs to, ordered by name.
    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SupportGroup>, CommunityRepositoryError>;

    /// Add `user_id` to a group and return the updated group.
    async fn join(
        &self,
        user_id: &UserId,
        group_id: Uuid,
    ) -> Result<SupportGroup, CommunityRepositoryError>;

    /// Remove `user_id` from a group and return the updated group.
    async fn leave(
        &self,
        user_id: &UserId,
        group_id: Uuid,
    ) -> Result<SupportGroup, CommunityRepositoryError>;
}

/// Therapist directory and contact requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TherapistRepository: Send + Sync {
    /// Every therapist, ordered by name.
    async fn list(&self) -> Result<Vec<Therapist>, CommunityRepositoryError>;

    /// Fetch one therapist.
    async fn find(&self, therapist_id: Uuid)
    -> Result<Option<Therapist>, CommunityRepositoryError>;

    /// Store a contact request.
    async fn insert_contact_request(
        &self,
        request: &ContactRequest,
    ) -> Result<(), CommunityRepositoryError>;

    /// Requests made by `user_id`, newest first.
    async fn list_contact_requests(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ContactRequest>, CommunityRepositoryError>;
}

impl From<CommunityRepositoryError> for crate::domain::Error {
    fn from(error: CommunityRepositoryError) -> Self {
        let message = error.to_string();
        match error {
            CommunityRepositoryError::Connection { .. } => Self::service_unavailable(message),
            CommunityRepositoryError::Query { .. } => Self::internal(message),
            CommunityRepositoryError::NotFound { .. } | CommunityRepositoryError::NotMember { .. } => {
                Self::not_found(message)
            }
            CommunityRepositoryError::GroupFull { .. }
            | CommunityRepositoryError::AlreadyMember { .. } => Self::conflict(message),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{Error, ErrorCode};
    use rstest::rstest;

    #[rstest]
    #[case(CommunityRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(CommunityRepositoryError::query("bad sql"), ErrorCode::InternalError)]
    #[case(CommunityRepositoryError::not_found(Uuid::nil()), ErrorCode::NotFound)]
    #[case(CommunityRepositoryError::not_member(Uuid::nil()), ErrorCode::NotFound)]
    #[case(CommunityRepositoryError::group_full(Uuid::nil()), ErrorCode::Conflict)]
    #[case(CommunityRepositoryError::already_member(Uuid::nil()), ErrorCode::Conflict)]
    fn maps_to_domain_codes(#[case] error: CommunityRepositoryError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(error).code(), expected);
    }
}
