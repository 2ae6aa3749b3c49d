//! SQLite repository implementations for castctl.
//!
//! Everything sqlx-shaped lives in this crate; the rest of the system
//! talks to it through the repository traits defined in `castctl-core`.

pub mod factory;
pub mod repositories;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CoreFactory;

// Re-export repository implementations
pub use repositories::{SqliteStreamRepository, SqliteUserRepository};

// Re-export setup functions for convenient access
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
