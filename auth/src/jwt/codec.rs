use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JwtLibError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenType;
use super::errors::TokenError;

/// Issues and parses signed tokens.
///
/// Uses HS256 (HMAC with SHA-256). A previous secret can be registered for
/// verification only, so tokens issued before a key rotation keep working
/// until they expire.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    algorithm: Algorithm,
    issuer: String,
}

impl TokenCodec {
    pub const DEFAULT_ISSUER: &'static str = "auth-service";

    /// Create a new codec with a signing secret.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_keys: vec![DecodingKey::from_secret(secret)],
            algorithm: Algorithm::HS256,
            issuer: Self::DEFAULT_ISSUER.to_string(),
        }
    }

    /// Set the issuer written into and required from every token.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Accept tokens signed with a retired secret.
    pub fn with_previous_secret(mut self, secret: &[u8]) -> Self {
        self.decoding_keys.push(DecodingKey::from_secret(secret));
        self
    }

    /// Issue a signed token valid from now for `ttl`.
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` is not positive
    /// * `EncodingFailed` - Signing failed
    pub fn issue(
        &self,
        subject: impl ToString,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(subject, token_type, ttl, Utc::now())
    }

    /// Issue a signed token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        subject: impl ToString,
        token_type: TokenType,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, token_type, self.issuer.clone(), issued_at, ttl)?;
        self.encode(&claims)
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// # Arguments
    /// * `token` - Encoded token
    /// * `expected` - Token type the caller is willing to accept
    ///
    /// # Errors
    /// * `Malformed` - Not a decodable token or required claims are missing
    /// * `UnexpectedAlgorithm` - Header names an algorithm other than the configured one
    /// * `InvalidSignature` - No configured key verifies the signature
    /// * `UnknownIssuer` - Issuer claim differs from this codec's issuer
    /// * `Expired` - Expiry is in the past
    /// * `TypeMismatch` - Token type differs from `expected`
    pub fn parse(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        self.parse_at(token, expected, Utc::now())
    }

    /// Verify a token against an explicit clock value.
    pub fn parse_at(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;
        if header.alg != self.algorithm {
            return Err(TokenError::UnexpectedAlgorithm(format!("{:?}", header.alg)));
        }

        let claims = self.verify_signature(token)?;
        claims.validate()?;

        if claims.iss != self.issuer {
            return Err(TokenError::UnknownIssuer(claims.iss));
        }

        if claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        if claims.token_type != expected {
            return Err(TokenError::TypeMismatch {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }

    fn verify_signature(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry and issuer are checked against the caller's clock in parse_at.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        for key in &self.decoding_keys {
            match decode::<Claims>(token, key, &validation) {
                Ok(token_data) => return Ok(token_data.claims),
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => continue,
                Err(e) => return Err(map_decode_error(e)),
            }
        }

        Err(TokenError::InvalidSignature)
    }
}

fn map_decode_error(error: JwtLibError) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::UnexpectedAlgorithm(error.to_string())
        }
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(error.to_string()),
    }
}
