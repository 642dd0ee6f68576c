//! Authentication error types

use http::StatusCode;
use lumora_db::DbError;
use thiserror::Error;

/// Message returned for every failure to authenticate a request
pub const UNAUTHENTICATED_MESSAGE: &str = "Could not validate credentials";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid Email or Password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid auth configuration: {0}")]
    Config(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    TokenSigning(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl AuthError {
    /// HTTP status reported to the client
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailAlreadyExists
            | AuthError::InvalidCredentials
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Config(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenSigning(_)
            | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::Unauthenticated => {
                "UNAUTHENTICATED"
            }
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::Config(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenSigning(_)
            | AuthError::Database(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Message safe to show to the client
    ///
    /// Token failures share one message so the response never tells which
    /// check rejected the credential. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::Unauthenticated => {
                UNAUTHENTICATED_MESSAGE.to_string()
            }
            AuthError::Config(_)
            | AuthError::PasswordHash(_)
            | AuthError::TokenSigning(_)
            | AuthError::Database(_) => {
                "Internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}
