//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Fails with [`DbError::Duplicate`] when the email is already taken. The
    /// check is the store's UNIQUE constraint, so two concurrent inserts of the
    /// same email cannot both succeed.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(format!("User with email '{}' already exists", user.email))
            }
            other => DbError::Connection(other),
        })?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
        })
    }

    /// Get a user by email (exact, case-sensitive match)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Count users registered under an email
    pub async fn count_users_with_email(&self, email: &str) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::in_memory().await.unwrap();

        let user = db.insert_user(new_user("Alice", "a@x.com")).await.unwrap();
        assert_eq!(user.id, 1);

        let by_email = db.get_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.name, "Alice");
        assert_eq!(by_email.password_hash, "$argon2id$placeholder");

        let by_id = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        assert!(db.get_user_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_store() {
        let db = Database::in_memory().await.unwrap();

        db.insert_user(new_user("Alice", "a@x.com")).await.unwrap();
        let err = db
            .insert_user(new_user("Another Alice", "a@x.com"))
            .await
            .unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(db.count_users_with_email("a@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let db = Database::in_memory().await.unwrap();

        db.insert_user(new_user("Alice", "a@x.com")).await.unwrap();

        assert!(db.get_user_by_email("A@X.COM").await.unwrap().is_none());
        db.insert_user(new_user("Shouty Alice", "A@X.COM")).await.unwrap();
        assert_eq!(db.count_users_with_email("a@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_file_database_created_with_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lumora.db");
        let url = format!("sqlite:{}", path.display());

        let db = Database::new(&url, 2).await.unwrap();
        db.insert_user(new_user("Alice", "a@x.com")).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unusable_directory_is_a_setup_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("nested").join("lumora.db");
        let url = format!("sqlite:{}", path.display());

        let result = Database::new(&url, 1).await;
        assert!(matches!(result, Err(DbError::Setup(_))));
    }
}
