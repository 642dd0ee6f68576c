//! Account registration and login

use lumora_db::{Database, NewUser, User};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cookie::CookieSettings;
use crate::error::AuthError;
use crate::jwt::JwtManager;
use crate::password::{hash_password, verify_password};

// ==================== Input Validation ====================

/// Maximum allowed display name length (characters)
const MAX_NAME_LENGTH: usize = 100;
/// Maximum allowed email length (RFC 5321 path limit)
const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum allowed password length (bounds hashing cost)
const MAX_PASSWORD_LENGTH: usize = 256;

fn validate_name(name: &str) -> Result<(), AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::Validation("Name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let invalid = || AuthError::Validation("Invalid email address".to_string());

    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password cannot be empty".to_string()));
    }
    validate_password_length(password)
}

fn validate_password_length(password: &str) -> Result<(), AuthError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Service ====================

/// Registration payload
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// `Set-Cookie` value carrying the token
    pub set_cookie: String,
}

/// Registers accounts and exchanges credentials for tokens
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    jwt: Arc<JwtManager>,
    cookie: CookieSettings,
    /// Verified against when the email is unknown so both failure paths cost the same
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        db: Database,
        jwt: Arc<JwtManager>,
        cookie: CookieSettings,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("lumora-account-enumeration-guard")?;
        Ok(Self {
            db,
            jwt,
            cookie,
            dummy_hash,
        })
    }

    /// Create a new account
    pub async fn register(&self, request: RegisterUser) -> Result<User, AuthError> {
        validate_name(&request.name)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        debug!("Registering account");

        let password_hash = hash_password(&request.password)?;

        let user = self
            .db
            .insert_user(NewUser {
                name: request.name.trim().to_string(),
                email: request.email,
                password_hash,
            })
            .await
            .map_err(|e| {
                if e.is_duplicate() {
                    AuthError::EmailAlreadyExists
                } else {
                    AuthError::Database(e)
                }
            })?;

        info!("Registered user id {}", user.id);
        Ok(user)
    }

    /// Check credentials and issue an access token
    ///
    /// Unknown email and wrong password produce the same error after the same
    /// amount of hashing work.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        validate_password_length(password)?;

        let user = self.db.get_user_by_email(email).await?;

        let hash_to_verify = match &user {
            Some(u) => u.password_hash.as_str(),
            None => self.dummy_hash.as_str(),
        };
        let password_valid = verify_password(password, hash_to_verify);

        let user = match (user, password_valid) {
            (Some(u), true) => u,
            (None, _) => {
                debug!("Login rejected: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            (Some(u), false) => {
                debug!("Login rejected: wrong password for user id {}", u.id);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.jwt.issue_token(user.id)?;
        let set_cookie = self.cookie.session_cookie(&token);

        info!("User id {} logged in", user.id);

        Ok(LoginSession {
            user,
            token,
            expires_in: self.jwt.token_ttl().num_seconds(),
            set_cookie,
        })
    }

    /// End the browser session
    ///
    /// Only the cookie is cleared. Tokens are not tracked server-side, so a
    /// token copied before logout stays valid until it expires.
    pub fn logout(&self) -> String {
        debug!("Clearing token cookie");
        self.cookie.clear_cookie()
    }
}
