use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use tokio::time::Instant;

use crate::domain::identity::errors::EmailError;
use crate::domain::identity::errors::PasswordPolicyError;
use crate::domain::identity::errors::UserIdError;

/// User aggregate entity.
///
/// The password hash never leaves the credential store, so it is not part of
/// this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User unique identifier type, assigned by the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from a token subject.
    ///
    /// # Errors
    /// * `InvalidFormat` - Subject is not a positive integer
    pub fn from_subject(subject: &str) -> Result<Self, UserIdError> {
        match subject.parse::<i64>() {
            Ok(id) if id > 0 => Ok(UserId(id)),
            Ok(id) => Err(UserIdError::InvalidFormat(id.to_string())),
            Err(e) => Err(UserIdError::InvalidFormat(e.to_string())),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password.
///
/// Exists only for the duration of a login or registration call and never
/// shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Login input.
///
/// The email is kept raw: a malformed address must fail exactly like an
/// unknown one.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Password,
}

impl Credentials {
    pub fn new(email: String, password: String) -> Self {
        Self {
            email: email.trim().to_string(),
            password: Password::new(password),
        }
    }
}

/// Command to register a new user with domain types
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterCommand {
    /// # Arguments
    /// * `email` - Validated email address
    /// * `password` - Plain text password (checked against the policy and hashed by the service)
    pub fn new(email: EmailAddress, password: String) -> Self {
        Self {
            email,
            password: Password::new(password),
        }
    }
}

/// Password rules applied at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPolicy {
    pub min_password_length: usize,
    pub max_password_length: usize,
}

impl RegistrationPolicy {
    pub fn check(&self, password: &Password) -> Result<(), PasswordPolicyError> {
        let actual = password.char_count();
        if actual < self.min_password_length {
            Err(PasswordPolicyError::TooShort {
                min: self.min_password_length,
                actual,
            })
        } else if actual > self.max_password_length {
            Err(PasswordPolicyError::TooLong {
                max: self.max_password_length,
                actual,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            max_password_length: 128,
        }
    }
}

/// Outcome of a successful login, registration or refresh.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub tokens: auth::TokenPair,
}

/// Point in time by which credential store calls must complete.
///
/// Created by the inbound adapter from the request it is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_subject() {
        assert_eq!(UserId::from_subject("42"), Ok(UserId(42)));
        assert!(UserId::from_subject("0").is_err());
        assert!(UserId::from_subject("-3").is_err());
        assert!(UserId::from_subject("abc").is_err());
        assert!(UserId::from_subject("").is_err());
    }

    #[test]
    fn test_email_address_validation() {
        let email = EmailAddress::new("  a@x.com ".to_string()).unwrap();
        assert_eq!(email.as_str(), "a@x.com");

        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let credentials = Credentials::new("a@x.com".to_string(), "hunter22".to_string());
        let rendered = format!("{:?}", credentials);

        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("Password(***)"));
    }

    #[test]
    fn test_registration_policy() {
        let policy = RegistrationPolicy::default();

        assert!(policy
            .check(&Password::new("password123".to_string()))
            .is_ok());
        assert_eq!(
            policy.check(&Password::new("short".to_string())),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        );
        assert_eq!(
            policy.check(&Password::new("x".repeat(129))),
            Err(PasswordPolicyError::TooLong {
                max: 128,
                actual: 129
            })
        );
    }
}
