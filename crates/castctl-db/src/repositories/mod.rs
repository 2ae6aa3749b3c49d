//! SQLite repository implementations.

mod row_mappers;
mod sqlite_stream_repository;
mod sqlite_user_repository;

pub use sqlite_stream_repository::SqliteStreamRepository;
pub use sqlite_user_repository::SqliteUserRepository;
