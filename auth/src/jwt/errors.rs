use thiserror::Error;

use super::claims::TokenType;

/// Error type for token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime must be positive")]
    InvalidTtl,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token issued by unknown issuer: {0}")]
    UnknownIssuer(String),

    #[error("Token is expired")]
    Expired,

    #[error("Expected {expected} token, got {actual} token")]
    TypeMismatch {
        expected: TokenType,
        actual: TokenType,
    },
}
