//! Row-to-domain mapping helpers shared by the repositories.

use std::str::FromStr;

use castctl_core::{RepositoryError, Stream, StreamStatus, User};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Column list for stream SELECTs, kept in one place so every query and
/// the mapper stay in sync.
pub const STREAM_SELECT_COLUMNS: &str =
    "id, title, video, rtmp_url, stream_key, looping, duration, status";

/// Map a `streams` row to the domain type.
pub fn row_to_stream(row: &SqliteRow) -> Result<Stream, RepositoryError> {
    let status_label: String = row
        .try_get("status")
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;
    let status = StreamStatus::from_str(&status_label).map_err(RepositoryError::Serialization)?;

    let duration: Option<i64> = row
        .try_get("duration")
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;
    let duration_secs = duration.and_then(|d| u32::try_from(d).ok()).filter(|d| *d > 0);

    Ok(Stream {
        id: get(row, "id")?,
        title: get(row, "title")?,
        video: get(row, "video")?,
        rtmp_url: get(row, "rtmp_url")?,
        stream_key: get(row, "stream_key")?,
        looping: get::<i64>(row, "looping")? != 0,
        duration_secs,
        status,
    })
}

/// Map a `users` row to the domain type.
pub fn row_to_user(row: &SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: get(row, "id")?,
        username: get(row, "username")?,
        password_hash: get(row, "password_hash")?,
        role: get(row, "role")?,
    })
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Storage(e.to_string()))
}
