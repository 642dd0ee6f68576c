//! Lumora Authentication
//!
//! This crate provides password hashing, JWT issuance and validation,
//! and resolution of the authenticated user for incoming requests.

pub mod cookie;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use cookie::CookieSettings;
pub use error::AuthError;
pub use jwt::{Claims, JwtConfig, JwtManager};
pub use middleware::{AuthResolver, extract_token};
pub use password::{hash_password, verify_password};
pub use service::{AuthService, LoginSession, RegisterUser};
