use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::identity::errors::AuthError;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::AuthSession;
use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::Deadline;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Authenticate an email/password pair and issue a token pair.
    ///
    /// # Arguments
    /// * `credentials` - Raw email and plaintext password
    /// * `deadline` - Bound for every credential store call
    ///
    /// # Returns
    /// Session with user identity and fresh tokens
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, inactive account or wrong password
    /// * `StoreUnavailable` - Store failed or the deadline elapsed
    /// * `Hashing` - Stored hash could not be checked
    async fn login(
        &self,
        credentials: Credentials,
        deadline: Deadline,
    ) -> Result<AuthSession, AuthError>;

    /// Create a user and issue a token pair without re-verifying the password.
    ///
    /// # Arguments
    /// * `command` - Validated email and plaintext password
    /// * `deadline` - Bound for the credential store call
    ///
    /// # Errors
    /// * `PasswordPolicy` - Password violates the registration policy
    /// * `RegistrationConflict` - Email is already registered
    /// * `StoreUnavailable` - Store failed or the deadline elapsed
    /// * `Hashing` - Password could not be hashed
    async fn register(
        &self,
        command: RegisterCommand,
        deadline: Deadline,
    ) -> Result<AuthSession, AuthError>;

    /// Exchange a refresh token for a brand-new token pair.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is not a valid, unrevoked refresh token
    /// * `InvalidCredentials` - Subject no longer exists or is inactive
    /// * `StoreUnavailable` - Store failed or the deadline elapsed
    async fn refresh(&self, refresh_token: &str, deadline: Deadline)
        -> Result<AuthSession, AuthError>;

    /// Revoke a refresh token and, optionally, the access token issued with it.
    ///
    /// # Errors
    /// * `InvalidToken` - Refresh token is not valid
    async fn logout(&self, refresh_token: &str, access_token: Option<&str>)
        -> Result<(), AuthError>;

    /// Verify an access token and return its subject.
    ///
    /// Performs no credential store lookup.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is not a valid, unrevoked access token
    async fn parse_access_token(&self, access_token: &str) -> Result<UserId, AuthError>;
}

/// Persistence and password checks for users.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Check a plaintext password against the stored hash of a user.
    ///
    /// # Returns
    /// True if the password matches; false on mismatch or unknown user
    ///
    /// # Errors
    /// * `Unavailable` - Storage operation failed
    /// * `Hashing` - Stored hash is unreadable
    async fn verify_password(&self, id: &UserId, password: &Password) -> Result<bool, StoreError>;

    /// Persist a new user.
    ///
    /// # Returns
    /// Identifier assigned by the store
    ///
    /// # Errors
    /// * `Conflict` - Email is already registered
    /// * `Unavailable` - Storage operation failed
    async fn create_user(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<UserId, StoreError>;
}

/// Token ids that must no longer be accepted.
///
/// Entries only need to live until the revoked token would expire anyway.
#[async_trait]
pub trait RevocationList: Send + Sync + 'static {
    /// Reject `jti` until `expires_at`.
    ///
    /// Check and insert happen as one step.
    ///
    /// # Returns
    /// True if this call revoked `jti`; false if it was already revoked
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Whether `jti` has been revoked.
    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError>;
}
