//! Stream handlers - CRUD plus encoder start/stop.
//!
//! The persisted `status` column is advisory only. Every read path here
//! repairs it against the supervisor's live registry before returning,
//! and start/stop write the label back after the supervisor call.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use castctl_core::{LaunchSpec, NewStream, Stream, StreamStatus, StreamUpdate};

use crate::auth::AuthedUser;
use crate::error::HttpError;
use crate::state::AppState;

/// Persist the advisory status label, logging instead of failing: the
/// registry already reflects the truth and the label is repaired on read.
async fn write_back_status(state: &AppState, id: i64, status: StreamStatus) {
    if let Err(e) = state.repos.streams.set_status(id, status).await {
        tracing::warn!(stream_id = id, error = %e, "failed to write back advisory status");
    }
}

fn validate(title: &str, video: &str, rtmp_url: &str) -> Result<(), HttpError> {
    if title.trim().is_empty() {
        return Err(HttpError::BadRequest("Title is required".to_string()));
    }
    if video.trim().is_empty() {
        return Err(HttpError::BadRequest("Video filename is required".to_string()));
    }
    if rtmp_url.trim().is_empty() {
        return Err(HttpError::BadRequest("RTMP URL is required".to_string()));
    }
    Ok(())
}

/// List all streams with read-repaired status.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthedUser,
) -> Result<Json<Vec<Stream>>, HttpError> {
    let mut streams = state.repos.streams.list().await?;
    for stream in &mut streams {
        // Live registry state always wins over the persisted label.
        stream.status = state.runner.status(stream.id).await;
    }
    Ok(Json(streams))
}

/// Create a new stream configuration.
pub async fn create(
    State(state): State<AppState>,
    _user: AuthedUser,
    Json(req): Json<NewStream>,
) -> Result<Json<Stream>, HttpError> {
    validate(&req.title, &req.video, &req.rtmp_url)?;
    let stream = state.repos.streams.insert(&req).await?;
    Ok(Json(stream))
}

/// Replace the configuration of an existing stream.
pub async fn update(
    State(state): State<AppState>,
    _user: AuthedUser,
    Path(id): Path<i64>,
    Json(req): Json<StreamUpdate>,
) -> Result<Json<Stream>, HttpError> {
    validate(&req.title, &req.video, &req.rtmp_url)?;
    state.repos.streams.update(id, &req).await?;
    let mut stream = state.repos.streams.get_by_id(id).await?;
    stream.status = state.runner.status(id).await;
    Ok(Json(stream))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: i64,
}

/// Delete a stream, stopping its encoder first.
pub async fn remove(
    State(state): State<AppState>,
    _user: AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<DeletedResponse>, HttpError> {
    if let Err(e) = state.runner.stop(id).await {
        tracing::warn!(stream_id = id, error = %e, "failed to stop encoder before delete");
    }
    state.repos.streams.delete(id).await?;
    Ok(Json(DeletedResponse { deleted: id }))
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: StreamStatus,
}

/// Start the encoder for a stream.
///
/// Idempotent: starting an already-running stream succeeds without
/// spawning a second process. A spawn failure surfaces as 503 and leaves
/// both the registry and the advisory label untouched.
pub async fn start(
    State(state): State<AppState>,
    _user: AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, HttpError> {
    let stream = state.repos.streams.get_by_id(id).await?;
    state.runner.start(LaunchSpec::from_stream(&stream)).await?;
    write_back_status(&state, id, StreamStatus::Running).await;
    Ok(Json(StatusResponse {
        status: StreamStatus::Running,
    }))
}

/// Stop the encoder for a stream. Stopping a stopped stream is a no-op.
pub async fn stop(
    State(state): State<AppState>,
    _user: AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, HttpError> {
    state.runner.stop(id).await?;
    write_back_status(&state, id, StreamStatus::Stopped).await;
    Ok(Json(StatusResponse {
        status: StreamStatus::Stopped,
    }))
}
