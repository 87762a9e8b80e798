use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::TokenError;

/// Kind of bearer token.
///
/// Access and refresh tokens share a signing key, so the type claim is the only
/// thing that keeps one from being accepted where the other is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token payload.
///
/// Every field is required; a token missing any of them fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Token type (access or refresh)
    pub token_type: TokenType,

    /// JWT ID (unique per issuance)
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a freshly issued token.
    ///
    /// # Arguments
    /// * `subject` - Subject identifier
    /// * `token_type` - Access or refresh
    /// * `issuer` - Issuer identity
    /// * `issued_at` - Issuance instant
    /// * `ttl` - Lifetime, must be positive
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` is zero or negative
    pub fn new(
        subject: impl ToString,
        token_type: TokenType,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }

        let iat = issued_at.timestamp();
        // Sub-second TTLs still need exp > iat at second resolution.
        let exp = (issued_at + ttl).timestamp().max(iat + 1);

        Ok(Self {
            sub: subject.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            iss: issuer.into(),
            iat,
            exp,
        })
    }

    /// Check the fields serde cannot check on its own.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.sub.trim().is_empty() {
            return Err(TokenError::Malformed("empty subject".to_string()));
        }
        if self.jti.trim().is_empty() {
            return Err(TokenError::Malformed("empty token id".to_string()));
        }
        if self.exp <= self.iat {
            return Err(TokenError::Malformed(
                "expiry is not after issuance".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Expiry as a UTC instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
