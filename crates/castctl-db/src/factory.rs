//! Factory for assembling repository trait objects.
//!
//! Adapters call [`CoreFactory::build_repos`] at their composition root so
//! they never touch concrete repository types directly.

use std::sync::Arc;

use castctl_core::Repos;
use sqlx::SqlitePool;

use crate::repositories::{SqliteStreamRepository, SqliteUserRepository};

/// Builds the repository container from a connection pool.
pub struct CoreFactory;

impl CoreFactory {
    /// Build all repositories backed by the given pool.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteStreamRepository::new(pool.clone())),
            Arc::new(SqliteUserRepository::new(pool)),
        )
    }
}
