//! Lumora Database Layer
//!
//! Persistence of user accounts in SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::{NewUser, User};
pub use repository::Database;
