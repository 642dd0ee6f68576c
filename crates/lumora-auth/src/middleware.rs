//! Resolution of the authenticated user for a request

use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};
use lumora_db::{Database, User};
use std::sync::Arc;
use tracing::debug;

use crate::cookie::CookieSettings;
use crate::error::AuthError;
use crate::jwt::JwtManager;

/// Extract the bearer token from the request headers
///
/// An `Authorization` header takes priority over the token cookie. A present
/// but malformed `Authorization` header is rejected rather than skipped.
pub fn extract_token<'a>(
    headers: &'a HeaderMap,
    cookie: &CookieSettings,
) -> Result<&'a str, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let header = value.to_str().map_err(|_| AuthError::InvalidToken)?;
        let (scheme, token) = header.split_once(' ').ok_or(AuthError::InvalidToken)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        return Ok(token);
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| cookie.find_in(value))
        .ok_or(AuthError::Unauthenticated)
}

/// Turns request credentials into the authenticated [`User`]
#[derive(Clone)]
pub struct AuthResolver {
    db: Database,
    jwt: Arc<JwtManager>,
    cookie: CookieSettings,
}

impl AuthResolver {
    pub fn new(db: Database, jwt: Arc<JwtManager>, cookie: CookieSettings) -> Self {
        Self { db, jwt, cookie }
    }

    /// Resolve the user behind the request credentials
    ///
    /// Every credential failure is reported as [`AuthError::Unauthenticated`];
    /// only store failures surface as themselves.
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<User, AuthError> {
        let token = extract_token(headers, &self.cookie).map_err(|e| {
            debug!("No usable credential: {}", e);
            AuthError::Unauthenticated
        })?;

        let claims = self.jwt.validate_token(token).map_err(|e| {
            debug!("Credential rejected: {}", e);
            AuthError::Unauthenticated
        })?;

        let user = self
            .db
            .get_user_by_id(claims.user_id)
            .await?
            .ok_or_else(|| {
                debug!("Token references missing user id {}", claims.user_id);
                AuthError::Unauthenticated
            })?;

        debug!("Authenticated user id {}", user.id);
        Ok(user)
    }
}
