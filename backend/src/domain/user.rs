//! User data model.
//!
//! A user is the root of tenant isolation: every journal row, goal, setting
//! and membership references a [`UserId`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Email was blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email did not look like `local@domain.tld`.
    #[error("email must look like name@example.com")]
    InvalidEmail,
    /// Email exceeded the maximum length.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Display name was blank once trimmed.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// Display name exceeded the maximum length.
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap a UUID loaded from storage.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum email length accepted (RFC 5321 path limit).
pub const EMAIL_MAX: usize = 254;

/// Normalised, unique login email.
///
/// ## Invariants
/// - Trimmed and lower-cased.
/// - Exactly one `@`, a non-empty local part, and a dotted domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use mindtrack::domain::Email;
    ///
    /// let email = Email::new("  Dana@Example.COM ").unwrap();
    /// assert_eq!(email.as_ref(), "dana@example.com");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@');
        if local.is_empty() || !domain_ok || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable name shown on the dashboard and in support groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`]; surrounding whitespace is trimmed.
    pub fn new(display_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = display_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: Email,
    display_name: DisplayName,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, email: Email, display_name: DisplayName) -> Self {
        Self {
            id,
            email,
            display_name,
        }
    }

    /// Fallible constructor enforcing identifier, email and name invariants.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        email: impl AsRef<str>,
        display_name: impl AsRef<str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self::new(
            UserId::new(id)?,
            Email::new(email)?,
            DisplayName::new(display_name)?,
        ))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}
