//! Application state

use lumora_auth::{AuthResolver, AuthService};
use lumora_db::Database;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub resolver: Arc<AuthResolver>,
}

impl AppState {
    pub fn new(db: Database, auth: Arc<AuthService>, resolver: Arc<AuthResolver>) -> Self {
        Self { db, auth, resolver }
    }
}
