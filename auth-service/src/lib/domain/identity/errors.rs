use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid user id: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for registration password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Failures reported by credential store adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    Conflict(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),

    #[error("Password hash check failed: {0}")]
    Hashing(String),
}

/// Top-level error for authentication operations.
///
/// Display strings of the first three variants are safe to show to callers;
/// they deliberately carry no detail about which check failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    RegistrationConflict,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    PasswordPolicy(#[from] PasswordPolicyError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AuthError::RegistrationConflict,
            StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
            StoreError::InvalidRecord(msg) => AuthError::Internal(msg),
            StoreError::Hashing(msg) => AuthError::Hashing(msg),
        }
    }
}
