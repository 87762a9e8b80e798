use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::jwt::TokenType;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Lifetimes of the two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    access: Duration,
    refresh: Duration,
}

impl TokenTtl {
    /// # Errors
    /// * `InvalidTtl` - Either lifetime is zero or negative
    pub fn new(access: Duration, refresh: Duration) -> Result<Self, TokenError> {
        if access <= Duration::zero() || refresh <= Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }
        Ok(Self { access, refresh })
    }

    pub fn access(&self) -> Duration {
        self.access
    }

    pub fn refresh(&self) -> Duration {
        self.refresh
    }
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(14),
        }
    }
}

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Authentication coordinator combining password hashing and token handling.
///
/// Holds only immutable configuration, so a single instance can be shared
/// across requests behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    ttl: TokenTtl,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher configured with the deployment's cost and pepper
    /// * `token_codec` - Codec holding the signing secret
    /// * `ttl` - Access and refresh token lifetimes
    pub fn new(password_hasher: PasswordHasher, token_codec: TokenCodec, ttl: TokenTtl) -> Self {
        Self {
            password_hasher,
            token_codec,
            ttl,
        }
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    pub fn ttl(&self) -> TokenTtl {
        self.ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Issue a fresh access/refresh pair for `subject`.
    ///
    /// # Errors
    /// * `TokenError` - Token generation failed
    pub fn issue_pair(&self, subject: impl ToString) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(subject, Utc::now())
    }

    /// Issue a pair as if the current time were `issued_at`.
    pub fn issue_pair_at(
        &self,
        subject: impl ToString,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let subject = subject.to_string();

        let access_token =
            self.token_codec
                .issue_at(&subject, TokenType::Access, self.ttl.access, issued_at)?;
        let refresh_token =
            self.token_codec
                .issue_at(&subject, TokenType::Refresh, self.ttl.refresh, issued_at)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_ttl: self.ttl.access,
            refresh_ttl: self.ttl.refresh,
        })
    }

    /// Validate a token of the expected type and return its claims.
    ///
    /// # Errors
    /// * `TokenError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        self.token_codec.parse(token, expected)
    }
}
