//! Token and password primitives for the credential-issuance service.
//!
//! - Password hashing (Argon2id, configurable cost, optional pepper)
//! - Typed access/refresh token issuance and validation (HS256 JWT)
//! - An `Authenticator` that binds both to a token lifetime policy
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenType};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.issue(42, TokenType::Access, Duration::minutes(15)).unwrap();
//! let claims = codec.parse(&token, TokenType::Access).unwrap();
//! assert_eq!(claims.sub, "42");
//! assert!(codec.parse(&token, TokenType::Refresh).is_err());
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{Authenticator, PasswordHasher, TokenCodec, TokenTtl, TokenType};
//!
//! let auth = Authenticator::new(
//!     PasswordHasher::new(),
//!     TokenCodec::new(b"secret_key_at_least_32_bytes_long!"),
//!     TokenTtl::default(),
//! );
//!
//! let pair = auth.issue_pair(42).unwrap();
//! let claims = auth.validate_token(&pair.refresh_token, TokenType::Refresh).unwrap();
//! assert_eq!(claims.sub, "42");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use authenticator::TokenTtl;
pub use jwt::Claims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use jwt::TokenType;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
