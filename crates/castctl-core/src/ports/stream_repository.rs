//! Stream repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewStream, Stream, StreamStatus, StreamUpdate};

/// Repository interface for stream configurations.
#[async_trait]
pub trait StreamRepository: Send + Sync {
    /// List all stream configurations.
    async fn list(&self) -> Result<Vec<Stream>, RepositoryError>;

    /// Get a stream by ID. Returns `NotFound` if it doesn't exist.
    async fn get_by_id(&self, id: i64) -> Result<Stream, RepositoryError>;

    /// Insert a new stream and return it with its assigned ID.
    async fn insert(&self, stream: &NewStream) -> Result<Stream, RepositoryError>;

    /// Replace the configuration fields of an existing stream.
    async fn update(&self, id: i64, update: &StreamUpdate) -> Result<(), RepositoryError>;

    /// Delete a stream. Deleting a missing ID is not an error.
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Write back the advisory status label.
    ///
    /// Best-effort cache only; the supervisor's live registry always wins
    /// on read (read-repair).
    async fn set_status(&self, id: i64, status: StreamStatus) -> Result<(), RepositoryError>;
}
