//! Video library handlers - upload, listing, rename, delete, Drive import.
//!
//! The media directory is flat; every entry point that takes a filename
//! validates it against a conservative character set so nothing can
//! escape the directory.

use axum::Json;
use axum::extract::{Multipart, Path as UrlPath, State};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::auth::AuthedUser;
use crate::error::HttpError;
use crate::state::AppState;

/// Whether `name` is a safe, plain `.mp4` filename (no path components).
fn is_valid_video_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".mp4")
        && name.len() > 4
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
}

/// Replace whitespace runs with underscores, as uploads arrive with
/// arbitrary original names.
fn sanitize_filename(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Find a name that doesn't collide in the media dir by prefixing a
/// counter (`1_name.mp4`, `2_name.mp4`, ...).
async fn unique_filename(dir: &Path, name: &str) -> Result<String, HttpError> {
    let mut candidate = name.to_string();
    let mut i = 1;
    while fs::try_exists(dir.join(&candidate))
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?
    {
        candidate = format!("{i}_{name}");
        i += 1;
    }
    Ok(candidate)
}

fn checked_media_path(state: &AppState, filename: &str) -> Result<PathBuf, HttpError> {
    if !is_valid_video_name(filename) {
        return Err(HttpError::BadRequest("Invalid filename".to_string()));
    }
    Ok(state.media_dir.join(filename))
}

/// List all `.mp4` files in the media directory.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthedUser,
) -> Result<Json<Vec<String>>, HttpError> {
    let mut entries = fs::read_dir(&state.media_dir)
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?
    {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_ascii_lowercase().ends_with(".mp4") {
            files.push(name);
        }
    }
    files.sort();
    Ok(Json(files))
}

#[derive(Serialize)]
pub struct DeletedFileResponse {
    pub deleted: String,
}

/// Delete a video file.
pub async fn remove(
    State(state): State<AppState>,
    _user: AuthedUser,
    UrlPath(filename): UrlPath<String>,
) -> Result<Json<DeletedFileResponse>, HttpError> {
    let path = checked_media_path(&state, &filename)?;
    if !fs::try_exists(&path)
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?
    {
        return Err(HttpError::NotFound("File not found".to_string()));
    }
    fs::remove_file(&path)
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?;
    Ok(Json(DeletedFileResponse { deleted: filename }))
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub new_name: String,
}

#[derive(Serialize)]
pub struct RenamedResponse {
    pub from: String,
    pub to: String,
}

/// Rename a video file.
pub async fn rename(
    State(state): State<AppState>,
    _user: AuthedUser,
    UrlPath(filename): UrlPath<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<RenamedResponse>, HttpError> {
    let old_path = checked_media_path(&state, &filename)?;
    let new_path = checked_media_path(&state, &req.new_name)?;

    if !fs::try_exists(&old_path)
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?
    {
        return Err(HttpError::NotFound("File not found".to_string()));
    }
    if fs::try_exists(&new_path)
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?
    {
        return Err(HttpError::Conflict("Filename already in use".to_string()));
    }

    fs::rename(&old_path, &new_path)
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?;
    Ok(Json(RenamedResponse {
        from: filename,
        to: req.new_name,
    }))
}

#[derive(Serialize)]
pub struct FilenameResponse {
    pub filename: String,
}

/// Accept a multipart video upload and store it in the media directory.
pub async fn upload(
    State(state): State<AppState>,
    _user: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<FilenameResponse>, HttpError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("video") {
            continue;
        }

        let is_video = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("video/"));
        if !is_video {
            return Err(HttpError::BadRequest("File must be a video".to_string()));
        }

        let original = field
            .file_name()
            .map(sanitize_filename)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| HttpError::BadRequest("Missing filename".to_string()))?;
        if !is_valid_video_name(&original) {
            return Err(HttpError::BadRequest("Invalid filename".to_string()));
        }

        let filename = unique_filename(&state.media_dir, &original).await?;
        let path = state.media_dir.join(&filename);

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| HttpError::Internal(e.to_string()))?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| HttpError::BadRequest(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| HttpError::Internal(e.to_string()))?;
        }
        file.flush()
            .await
            .map_err(|e| HttpError::Internal(e.to_string()))?;

        tracing::info!(%filename, "video uploaded");
        return Ok(Json(FilenameResponse { filename }));
    }

    Err(HttpError::BadRequest("No file uploaded".to_string()))
}

// ============================================================================
// Google Drive import
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DriveImportRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileMeta {
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

/// Pull the file id out of a Drive share URL (`.../d/<id>/view`).
fn extract_drive_file_id(url: &str) -> Option<&str> {
    let rest = url.split_once("/d/")?.1;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

/// Import a video from a Google Drive share link.
///
/// Requires a Drive API key in the server configuration; the file is
/// streamed to disk rather than buffered.
pub async fn drive_import(
    State(state): State<AppState>,
    _user: AuthedUser,
    Json(req): Json<DriveImportRequest>,
) -> Result<Json<FilenameResponse>, HttpError> {
    let file_id = extract_drive_file_id(&req.url)
        .ok_or_else(|| HttpError::BadRequest("Invalid Google Drive URL".to_string()))?;
    let api_key = state.drive_api_key.as_deref().ok_or_else(|| {
        HttpError::ServiceUnavailable("Drive import is not configured".to_string())
    })?;

    let meta: DriveFileMeta = state
        .http
        .get(format!(
            "https://www.googleapis.com/drive/v3/files/{file_id}?fields=name,mimeType&key={api_key}"
        ))
        .send()
        .await
        .map_err(|e| HttpError::ServiceUnavailable(e.to_string()))?
        .error_for_status()
        .map_err(|e| HttpError::ServiceUnavailable(e.to_string()))?
        .json()
        .await
        .map_err(|e| HttpError::ServiceUnavailable(e.to_string()))?;

    if !meta.mime_type.starts_with("video/") {
        return Err(HttpError::BadRequest("File is not a video".to_string()));
    }

    let sanitized = sanitize_filename(&meta.name);
    if !is_valid_video_name(&sanitized) {
        return Err(HttpError::BadRequest("Unsupported filename".to_string()));
    }
    let filename = unique_filename(&state.media_dir, &sanitized).await?;
    let path = state.media_dir.join(&filename);

    let response = state
        .http
        .get(format!(
            "https://www.googleapis.com/drive/v3/files/{file_id}?alt=media&key={api_key}"
        ))
        .send()
        .await
        .map_err(|e| HttpError::ServiceUnavailable(e.to_string()))?
        .error_for_status()
        .map_err(|e| HttpError::ServiceUnavailable(e.to_string()))?;

    let mut file = fs::File::create(&path)
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| HttpError::ServiceUnavailable(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| HttpError::Internal(e.to_string()))?;
    }
    file.flush()
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?;

    tracing::info!(%filename, "video imported from Drive");
    Ok(Json(FilenameResponse { filename }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_video_names() {
        assert!(is_valid_video_name("intro.mp4"));
        assert!(is_valid_video_name("My Clip-2.MP4"));
        assert!(!is_valid_video_name("clip.mkv"));
        assert!(!is_valid_video_name("../../etc/passwd.mp4"));
        assert!(!is_valid_video_name("a/b.mp4"));
        assert!(!is_valid_video_name(".mp4"));
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_filename("my  cool\tvideo.mp4"), "my_cool_video.mp4");
    }

    #[test]
    fn drive_id_extraction() {
        assert_eq!(
            extract_drive_file_id("https://drive.google.com/file/d/abc_123-XY/view?usp=sharing"),
            Some("abc_123-XY")
        );
        assert_eq!(extract_drive_file_id("https://example.com/nope"), None);
        assert_eq!(extract_drive_file_id("https://drive.google.com/file/d//view"), None);
    }
}
