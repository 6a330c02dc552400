//! Support groups and the therapist directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::{Uuid, uuid};

use super::UserId;
use super::labels::define_label_enum;

/// Maximum contact request message length.
pub const CONTACT_MESSAGE_MAX: usize = 2000;

/// A peer support group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportGroup {
    /// Group identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Theme of the group, for example `anxiety`.
    pub topic: String,
    /// Longer description.
    pub description: String,
    /// Maximum number of members.
    pub capacity: i32,
    /// Current number of members.
    pub member_count: i32,
}

impl SupportGroup {
    /// Whether another member can join.
    pub fn has_room(&self) -> bool {
        self.member_count < self.capacity
    }
}

/// A therapist listed in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Therapist {
    /// Therapist identifier.
    pub id: Uuid,
    /// Full name.
    pub name: String,
    /// Areas of practice.
    pub specialties: Vec<String>,
    /// Whether new contact requests are accepted.
    pub accepting_clients: bool,
}

define_label_enum! {
    /// Channel a user would like to be contacted on.
    PreferredContact ("preferred contact") {
        /// Email reply.
        Email => "email",
        /// Phone call.
        Phone => "phone",
        /// Video session.
        Video => "video",
    }
}

/// Validation errors for contact requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactRequestValidationError {
    /// Message was blank.
    #[error("message must not be empty")]
    EmptyMessage,
    /// Message too long.
    #[error("message must be at most {max} characters")]
    MessageTooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// A request from a user to be contacted by a therapist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    /// Request identifier.
    pub id: Uuid,
    /// Requesting user.
    pub user_id: UserId,
    /// Target therapist.
    pub therapist_id: Uuid,
    /// Message for the therapist.
    pub message: String,
    /// Preferred channel.
    pub preferred_contact: PreferredContact,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl ContactRequest {
    /// Validate and build a contact request.
    pub fn try_new(
        user_id: UserId,
        therapist_id: Uuid,
        message: &str,
        preferred_contact: PreferredContact,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ContactRequestValidationError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ContactRequestValidationError::EmptyMessage);
        }
        if message.chars().count() > CONTACT_MESSAGE_MAX {
            return Err(ContactRequestValidationError::MessageTooLong {
                max: CONTACT_MESSAGE_MAX,
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            therapist_id,
            message: message.to_owned(),
            preferred_contact,
            created_at,
        })
    }
}

/// Support groups every fresh deployment starts with.
///
/// The PostgreSQL migrations insert the same rows with the same identifiers.
pub fn starter_support_groups() -> Vec<SupportGroup> {
    [
        (
            uuid!("6f1c2a44-1d1b-4c55-9a57-0b3f6a1e7a01"),
            "Anxiety Support Circle",
            "anxiety",
            "A calm space to share coping strategies for everyday anxiety.",
            12,
        ),
        (
            uuid!("6f1c2a44-1d1b-4c55-9a57-0b3f6a1e7a02"),
            "Mindful Mornings",
            "mindfulness",
            "Short guided check-ins to start the day with intention.",
            20,
        ),
        (
            uuid!("6f1c2a44-1d1b-4c55-9a57-0b3f6a1e7a03"),
            "Grief and Loss",
            "grief",
            "Peer support for people navigating bereavement.",
            8,
        ),
    ]
    .into_iter()
    .map(|(id, name, topic, description, capacity)| SupportGroup {
        id,
        name: name.to_owned(),
        topic: topic.to_owned(),
        description: description.to_owned(),
        capacity,
        member_count: 0,
    })
    .collect()
}

/// Therapists every fresh deployment starts with.
pub fn starter_therapists() -> Vec<Therapist> {
    [
        (
            uuid!("a4d9e0b2-7c3f-4e8a-b1d2-5c6e7f8a9b01"),
            "Dr. Maya Chen",
            &["anxiety", "cbt"][..],
            true,
        ),
        (
            uuid!("a4d9e0b2-7c3f-4e8a-b1d2-5c6e7f8a9b02"),
            "Dr. Samuel Okafor",
            &["depression", "trauma"][..],
            true,
        ),
        (
            uuid!("a4d9e0b2-7c3f-4e8a-b1d2-5c6e7f8a9b03"),
            "Dr. Ingrid Larsen",
            &["grief", "family"][..],
            false,
        ),
    ]
    .into_iter()
    .map(|(id, name, specialties, accepting_clients)| Therapist {
        id,
        name: name.to_owned(),
        specialties: specialties.iter().map(|s| (*s).to_owned()).collect(),
        accepting_clients,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", ContactRequestValidationError::EmptyMessage)]
    #[case("   ", ContactRequestValidationError::EmptyMessage)]
    #[case(&"m".repeat(CONTACT_MESSAGE_MAX + 1), ContactRequestValidationError::MessageTooLong { max: CONTACT_MESSAGE_MAX })]
    fn contact_request_validates_message(
        #[case] message: &str,
        #[case] expected: ContactRequestValidationError,
    ) {
        let err = ContactRequest::try_new(
            UserId::random(),
            Uuid::new_v4(),
            message,
            PreferredContact::Email,
            Utc::now(),
        )
        .expect_err("invalid message");
        assert_eq!(err, expected);
    }

    #[test]
    fn group_room_tracks_capacity() {
        let mut group = starter_support_groups().remove(0);
        assert!(group.has_room());
        group.member_count = group.capacity;
        assert!(!group.has_room());
    }

    #[test]
    fn starter_directory_has_a_closed_practice() {
        let therapists = starter_therapists();
        assert_eq!(therapists.len(), 3);
        assert!(therapists.iter().any(|t| !t.accepting_clients));
    }
}
