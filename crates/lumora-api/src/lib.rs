//! Lumora REST API
//!
//! This crate provides the Axum-based HTTP API for account registration,
//! login, logout and the authenticated identity endpoint.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{CurrentUser, create_router};
pub use state::AppState;
