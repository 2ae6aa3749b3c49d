//! User repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewUser, User};

/// Repository interface for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by username. Returns `NotFound` if absent.
    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError>;

    /// Look up a user by ID. Returns `NotFound` if absent.
    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError>;

    /// Insert a new account. Returns `AlreadyExists` on a username clash.
    async fn insert(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Replace the stored password hash for an account.
    async fn set_password_hash(&self, id: i64, hash: &str) -> Result<(), RepositoryError>;
}
