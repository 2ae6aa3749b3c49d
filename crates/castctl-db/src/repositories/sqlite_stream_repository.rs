//! `SQLite` implementation of the `StreamRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use castctl_core::{NewStream, RepositoryError, Stream, StreamRepository, StreamStatus, StreamUpdate};

use super::row_mappers::{STREAM_SELECT_COLUMNS, row_to_stream};

/// `SQLite` implementation of the `StreamRepository` trait.
pub struct SqliteStreamRepository {
    pool: SqlitePool,
}

impl SqliteStreamRepository {
    /// Create a new `SQLite` stream repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

#[async_trait]
impl StreamRepository for SqliteStreamRepository {
    async fn list(&self) -> Result<Vec<Stream>, RepositoryError> {
        let query = format!("SELECT {STREAM_SELECT_COLUMNS} FROM streams ORDER BY id");

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.iter().map(row_to_stream).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Stream, RepositoryError> {
        let query = format!("SELECT {STREAM_SELECT_COLUMNS} FROM streams WHERE id = ?");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| RepositoryError::NotFound(format!("Stream with ID {id}")))?;

        row_to_stream(&row)
    }

    async fn insert(&self, stream: &NewStream) -> Result<Stream, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO streams (title, video, rtmp_url, stream_key, looping, duration) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&stream.title)
        .bind(&stream.video)
        .bind(&stream.rtmp_url)
        .bind(&stream.stream_key)
        .bind(i64::from(stream.looping))
        .bind(stream.duration_secs.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    async fn update(&self, id: i64, update: &StreamUpdate) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE streams SET title = ?, video = ?, rtmp_url = ?, stream_key = ?, \
             looping = ?, duration = ? WHERE id = ?",
        )
        .bind(&update.title)
        .bind(&update.video)
        .bind(&update.rtmp_url)
        .bind(&update.stream_key)
        .bind(i64::from(update.looping))
        .bind(update.duration_secs.map(i64::from))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Stream with ID {id}")));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM streams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn set_status(&self, id: i64, status: StreamStatus) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE streams SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}
