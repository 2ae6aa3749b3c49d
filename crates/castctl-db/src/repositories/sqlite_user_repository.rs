//! `SQLite` implementation of the `UserRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use castctl_core::{NewUser, RepositoryError, User, UserRepository};

use super::row_mappers::row_to_user;

const USER_SELECT_COLUMNS: &str = "id, username, password_hash, role";

/// `SQLite` implementation of the `UserRepository` trait.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new `SQLite` user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_insert_err(username: &str, e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::AlreadyExists(format!("User '{username}'"))
        }
        _ => RepositoryError::Storage(e.to_string()),
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        let query = format!("SELECT {USER_SELECT_COLUMNS} FROM users WHERE username = ?");

        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?
            .ok_or_else(|| RepositoryError::NotFound(format!("User '{username}'")))?;

        row_to_user(&row)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        let query = format!("SELECT {USER_SELECT_COLUMNS} FROM users WHERE id = ?");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?
            .ok_or_else(|| RepositoryError::NotFound(format!("User with ID {id}")))?;

        row_to_user(&row)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_err(&user.username, e))?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("User with ID {id}")));
        }
        Ok(())
    }
}
