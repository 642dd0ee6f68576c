//! API routes

mod auth;
mod health;
mod types;

use axum::Router;
use axum::http::Uri;

use crate::error::ApiError;
use crate::state::AppState;

pub use auth::CurrentUser;
pub use types::*;

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .fallback(not_found)
        .with_state(state)
}
