//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::AuthError;

/// Minimum accepted length of the signing secret in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted default token lifetime in days
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// ID of the user the token was issued to
    pub user_id: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Absolute expiry of the token
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Settings needed to sign and verify tokens
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Algorithm name, one of `HS256`, `HS384`, `HS512`
    pub algorithm: String,
    /// Lifetime of tokens issued without an explicit TTL
    pub token_ttl: Duration,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    token_ttl: Duration,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Create a new JWT manager
    ///
    /// Rejects short secrets, TTLs that are not positive or exceed
    /// [`MAX_TOKEN_TTL_DAYS`], and any algorithm other than the HMAC family.
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        if config.secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "JWT secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        let algorithm = Algorithm::from_str(&config.algorithm).map_err(|_| {
            AuthError::Config(format!("Unknown JWT algorithm: {}", config.algorithm))
        })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::Config(format!(
                "JWT algorithm must be HS256, HS384 or HS512, got {}",
                config.algorithm
            )));
        }

        if config.token_ttl <= Duration::zero() {
            return Err(AuthError::Config(
                "Token TTL must be positive".to_string(),
            ));
        }
        if config.token_ttl > Duration::days(MAX_TOKEN_TTL_DAYS) {
            return Err(AuthError::Config(format!(
                "Token TTL must not exceed {} days",
                MAX_TOKEN_TTL_DAYS
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            token_ttl: config.token_ttl,
        })
    }

    /// Lifetime of tokens issued by [`JwtManager::issue_token`]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issue a token for a user with the default TTL
    pub fn issue_token(&self, user_id: i64) -> Result<String, AuthError> {
        self.issue_token_with_ttl(user_id, self.token_ttl)
    }

    /// Issue a token for a user that expires after `ttl`
    pub fn issue_token_with_ttl(&self, user_id: i64, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or_else(|| {
            AuthError::TokenSigning(format!("Token expiry out of range for TTL {}", ttl))
        })?;

        let claims = Claims {
            user_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing token for user id: {}", user_id);

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    /// Validate a token and return its claims
    ///
    /// The signature is checked before expiry, so a tampered token is always
    /// reported as invalid and only a genuine token can be reported as expired.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        debug!("Token rejected: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;

        // Expiry must be strictly in the future
        let now = Utc::now().timestamp();
        if token_data.claims.exp <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}
