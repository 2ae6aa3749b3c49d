//! Stream domain types.
//!
//! A stream is a declarative description of one restream job: which local
//! video file to push, where to push it, and how. Whether an encoder is
//! actually running for it is runtime state owned by the supervisor, not
//! by these types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Advisory status label persisted alongside a stream.
///
/// This is a best-effort cache. The supervisor's registry is the single
/// source of truth for "is an encoder running right now"; readers must
/// reconcile this label against the live registry before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    /// No encoder process is active for this stream.
    #[default]
    Stopped,
    /// An encoder process is registered for this stream.
    Running,
}

impl StreamStatus {
    /// Canonical string form as stored in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "stopped" => Ok(Self::Stopped),
            other => Err(format!("unknown stream status '{other}'")),
        }
    }
}

/// A stream configuration that exists in the store with a database ID.
///
/// Use [`NewStream`] for configurations that haven't been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    /// Database ID; also the supervisor's registry key.
    pub id: i64,
    /// Human-readable title.
    pub title: String,
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
    /// Advisory status label (see [`StreamStatus`]).
    pub status: StreamStatus,
}

/// A stream configuration to be inserted into the store (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStream {
    pub title: String,
    pub video: String,
    pub rtmp_url: String,
    pub stream_key: String,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub duration_secs: Option<u32>,
}

/// Full-record update for an existing stream.
///
/// The advisory status is not part of an update; it only changes through
/// the supervisor write-back path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUpdate {
    pub title: String,
    pub video: String,
    pub rtmp_url: String,
    pub stream_key: String,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub duration_secs: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!(
            StreamStatus::from_str(StreamStatus::Running.as_str()).unwrap(),
            StreamStatus::Running
        );
        assert_eq!(
            StreamStatus::from_str(StreamStatus::Stopped.as_str()).unwrap(),
            StreamStatus::Stopped
        );
    }

    #[test]
    fn status_rejects_unknown_labels() {
        assert!(StreamStatus::from_str("paused").is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&StreamStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}
