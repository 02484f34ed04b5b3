use crate::models::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validity window of issued tokens unless configured otherwise (7 days).
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username of the authenticated account.
    pub username: String,
    /// Role of the account at the time the token was issued.
    pub role: Role,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is well-formed and correctly signed but its `exp` has passed.
    #[error("Token expired")]
    Expired,
    /// Malformed, tampered, wrongly signed or wrongly typed token.
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Failed to generate token: {0}")]
    Encoding(String),
}

/// Issues and validates signed identity tokens.
pub trait TokenService: Send + Sync {
    fn issue_token(&self, username: &str, role: Role) -> Result<String, TokenError>;
    fn validate_token(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JSON Web Token implementation of [`TokenService`].
///
/// The secret is handed in once at construction; nothing is read from the
/// environment per request.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        // Only HS256 is accepted, which rejects algorithm substitution.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl TokenService for JwtService {
    fn issue_token(&self, username: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Encoding("expiration overflows".into()))?;

        let claims = Claims {
            username: username.to_string(),
            role,
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
