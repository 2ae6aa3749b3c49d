//! Encoder runner trait definition.
//!
//! This port defines the interface for supervising encoder subprocesses.
//! Implementations own all process lifecycle details internally; callers
//! only ever speak in stream ids and launch intents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProcessError;
use crate::domain::{Stream, StreamStatus};

/// Intent to launch an encoder for one stream.
///
/// This expresses what the caller wants pushed where; how the encoder is
/// invoked (binary path, argument order, log plumbing) is the runner's
/// concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Stream ID; the supervisor's registry key.
    pub stream_id: i64,
    /// Filename of the source video inside the media directory.
    pub video: String,
    /// Base URL of the destination RTMP ingest.
    pub rtmp_url: String,
    /// Secret stream key appended to `rtmp_url`.
    pub stream_key: String,
    /// Whether the source should repeat indefinitely.
    pub looping: bool,
    /// Optional bound on output length in seconds; `None` or 0 = unbounded.
    pub duration_secs: Option<u32>,
}

impl LaunchSpec {
    /// Build a launch spec from a persisted stream configuration.
    pub fn from_stream(stream: &Stream) -> Self {
        Self {
            stream_id: stream.id,
            video: stream.video.clone(),
            rtmp_url: stream.rtmp_url.clone(),
            stream_key: stream.stream_key.clone(),
            looping: stream.looping,
            duration_secs: stream.duration_secs,
        }
    }
}

/// Result of a successful `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new encoder process was spawned and registered.
    Started,
    /// An encoder was already registered for this stream; nothing was done.
    ///
    /// Start is idempotent: duplicate or retried requests are expected from
    /// the HTTP layer and must not produce a second process or an error.
    AlreadyRunning,
}

/// Supervisor for encoder subprocesses, keyed by stream id.
///
/// Implementations must uphold:
/// - at most one live process per stream id at any instant
/// - `start` returns once the process is launched (or the no-op is
///   detected), never once it finishes
/// - `stop` removes the registration immediately without waiting for the
///   process to actually die; stopping an absent id is a no-op
/// - `status` is a point-in-time snapshot of registry membership
#[async_trait]
pub trait EncoderRunner: Send + Sync {
    /// Start an encoder for the given spec. Idempotent per stream id.
    async fn start(&self, spec: LaunchSpec) -> Result<StartOutcome, ProcessError>;

    /// Request graceful termination and deregister the stream.
    async fn stop(&self, stream_id: i64) -> Result<(), ProcessError>;

    /// Whether an encoder is currently registered for the stream.
    async fn status(&self, stream_id: i64) -> StreamStatus;

    /// IDs of all currently registered streams.
    async fn running_ids(&self) -> Vec<i64>;

    /// Stop every registered stream (server shutdown path).
    async fn shutdown(&self);
}
