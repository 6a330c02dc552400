//! Authentication primitives: login credentials, registrations and password
//! digests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;
use std::sync::LazyLock;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::RngCore;
use zeroize::Zeroizing;

use super::{DisplayName, Email, UserValidationError};

/// Minimum accepted password length for new registrations.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length for new registrations.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when login or registration payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    Email(UserValidationError),
    /// Display name was missing or too long.
    DisplayName(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password length was outside the accepted bounds.
    PasswordLength {
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) | Self::DisplayName(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordLength { min, max } => {
                write!(f, "password must be between {min} and {max} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is normalised (see [`Email`]).
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use mindtrack::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Dana@example.com", "hunter22").unwrap();
/// assert_eq!(creds.email().as_ref(), "dana@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Owned copy of the password that is wiped when dropped, for moving
    /// into a blocking task.
    pub fn secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    display_name: DisplayName,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate a sign-up payload.
    pub fn try_from_parts(
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;
        let display_name =
            DisplayName::new(display_name).map_err(CredentialsValidationError::DisplayName)?;
        let length = password.chars().count();
        if length == 0 {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(CredentialsValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            email,
            display_name,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Requested display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Plain-text password, only used to derive a [`PasswordDigest`].
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Owned copy of the password that is wiped when dropped.
    pub fn secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

/// Error raised when a password cannot be hashed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Argon2id digest stored in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

static DECOY_DIGEST: LazyLock<Option<PasswordDigest>> =
    LazyLock::new(|| PasswordDigest::hash(&uuid::Uuid::new_v4().to_string()).ok());

impl PasswordDigest {
    /// Hash a plain-text password with a fresh random salt.
    pub fn hash(password: &str) -> Result<Self, PasswordHashError> {
        let mut salt_bytes = [0_u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|err| PasswordHashError {
            message: err.to_string(),
        })?;
        let digest = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })?;
        Ok(Self(digest.to_string()))
    }

    /// Digest of a random password nobody knows, hashed with the same
    /// parameters as real accounts.
    ///
    /// Logins for unknown emails verify against it so they cost as much as a
    /// wrong password for a real account.
    pub fn decoy() -> Option<&'static Self> {
        DECOY_DIGEST.as_ref()
    }

    /// Wrap a digest loaded from storage.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Check a candidate password. Malformed stored digests never verify.
    pub fn verify(&self, password: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(error) => {
                tracing::warn!(%error, "stored password digest is malformed");
                false
            }
        }
    }

    /// PHC string for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw")]
    #[case("   ", "pw")]
    #[case("nope", "pw")]
    fn login_rejects_bad_email(#[case] email: &str, #[case] password: &str) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("invalid email");
        assert!(matches!(err, CredentialsValidationError::Email(_)));
    }

    #[test]
    fn login_rejects_empty_password() {
        let err = LoginCredentials::try_from_parts("a@example.com", "").expect_err("empty");
        assert_eq!(err, CredentialsValidationError::EmptyPassword);
    }

    #[rstest]
    #[case("short")]
    #[case(&"x".repeat(PASSWORD_MAX + 1))]
    fn registration_enforces_password_length(#[case] password: &str) {
        let err = Registration::try_from_parts("a@example.com", "Avi", password)
            .expect_err("bad length");
        assert_eq!(
            err,
            CredentialsValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX
            }
        );
    }

    #[test]
    fn registration_rejects_blank_name() {
        let err = Registration::try_from_parts("a@example.com", "  ", "long-enough")
            .expect_err("blank name");
        assert!(matches!(err, CredentialsValidationError::DisplayName(_)));
    }

    #[test]
    fn digest_verifies_only_the_original_password() {
        let digest = PasswordDigest::hash("correct horse").expect("hash");
        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(digest.verify("correct horse"));
        assert!(!digest.verify("wrong horse"));
    }

    fn phc_parameters(digest: &PasswordDigest) -> Vec<&str> {
        digest.as_str().split('$').take(4).collect()
    }

    #[test]
    fn decoy_uses_the_account_hashing_parameters() {
        let decoy = PasswordDigest::decoy().expect("decoy digest");
        let real = PasswordDigest::hash("correct horse").expect("hash");
        assert_eq!(phc_parameters(decoy), phc_parameters(&real));
        assert!(!decoy.verify("correct horse"));
        assert!(!decoy.verify(""));
    }

    #[test]
    fn secrets_are_zeroizing_copies() {
        let creds = LoginCredentials::try_from_parts("a@example.com", "hunter22").expect("creds");
        let secret: Zeroizing<String> = creds.secret();
        assert_eq!(secret.as_str(), creds.password());

        let registration =
            Registration::try_from_parts("a@example.com", "Avi", "long-enough").expect("valid");
        let secret: Zeroizing<String> = registration.secret();
        assert_eq!(secret.as_str(), "long-enough");
    }

    #[test]
    fn malformed_digest_never_verifies() {
        assert!(!PasswordDigest::from_stored("not-a-phc-string").verify("anything"));
    }

    #[test]
    fn digest_debug_hides_contents() {
        let digest = PasswordDigest::from_stored("$argon2id$secret");
        assert_eq!(format!("{digest:?}"), "PasswordDigest(..)");
    }
}
