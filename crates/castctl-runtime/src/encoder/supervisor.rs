//! Encoder process supervisor.
//!
//! One supervisor instance exists per server process, constructed at
//! bootstrap and shared via `Arc`. It owns the only mapping from stream id
//! to live encoder process; every mutation of that mapping (insert on
//! start, remove on stop, remove on exit observation) goes through a
//! single mutex, which is what guarantees at-most-one-process-per-stream
//! under concurrent callers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use castctl_core::{EncoderRunner, LaunchSpec, ProcessError, StartOutcome, StreamStatus};

use super::launch::launch_args;
use super::signal::request_exit;

/// Registry entry for one live encoder process.
///
/// The `Child` handle itself is owned by the exit-observer task (which
/// must be able to await `wait()`), so the registry records the pid. The
/// pid doubles as a generation marker: a stale exit observation for a
/// stream that has since been stopped and restarted compares pids and
/// becomes a no-op instead of evicting the successor.
#[derive(Debug, Clone, Copy)]
struct SupervisedProcess {
    pid: u32,
    started_at: u64,
}

/// Supervisor for ffmpeg encoder subprocesses, keyed by stream id.
pub struct EncoderSupervisor {
    encoder_path: PathBuf,
    media_dir: PathBuf,
    registry: Arc<Mutex<HashMap<i64, SupervisedProcess>>>,
}

impl EncoderSupervisor {
    /// Create a supervisor with an empty registry.
    ///
    /// `encoder_path` is the ffmpeg binary (a bare name resolves through
    /// PATH); `media_dir` is the absolute directory source videos live in.
    pub fn new(encoder_path: impl Into<PathBuf>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            encoder_path: encoder_path.into(),
            media_dir: media_dir.into(),
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Start an encoder for `spec`. Idempotent per stream id.
    pub async fn start(&self, spec: LaunchSpec) -> Result<StartOutcome, ProcessError> {
        let mut cmd = Command::new(&self.encoder_path);
        cmd.args(launch_args(&spec, &self.media_dir));
        self.launch(spec.stream_id, cmd).await
    }

    /// Spawn `cmd` and register it under `stream_id`.
    ///
    /// The membership check, the spawn, and the insert all happen inside
    /// one critical section, so two concurrent starts for the same id are
    /// strictly ordered: the second observes the first's entry and becomes
    /// the idempotent no-op. A concurrent `stop` is likewise ordered
    /// entirely before or after the whole start.
    async fn launch(&self, stream_id: i64, mut cmd: Command) -> Result<StartOutcome, ProcessError> {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut registry = self.registry.lock().await;
        if registry.contains_key(&stream_id) {
            debug!(stream_id, "encoder already registered, start is a no-op");
            return Ok(StartOutcome::AlreadyRunning);
        }

        // Spawn failure leaves the registry untouched: the caller must
        // never be led to believe the stream is running.
        let mut child = cmd
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed(e.to_string()))?;
        let pid = child
            .id()
            .ok_or_else(|| ProcessError::SpawnFailed("child has no pid".to_string()))?;

        if let Some(stdout) = child.stdout.take() {
            forward_output_lines(stream_id, "stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output_lines(stream_id, "stderr", stderr);
        }

        let started_at = now_secs();
        registry.insert(stream_id, SupervisedProcess { pid, started_at });
        info!(stream_id, pid, "encoder started");

        // Exit observer: owns the Child, reaps it on exit (any cause) and
        // deregisters the stream. This is the only path that removes an
        // entry due to natural process death, and it fires exactly once.
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => info!(stream_id, pid, %status, "encoder exited"),
                Err(e) => warn!(stream_id, pid, error = %e, "failed waiting on encoder"),
            }
            let mut registry = registry.lock().await;
            // Pid-guarded removal: after a stop (entry already gone) or a
            // stop-then-restart (entry belongs to a newer process) this is
            // a no-op.
            if registry.get(&stream_id).is_some_and(|p| p.pid == pid) {
                registry.remove(&stream_id);
                debug!(stream_id, pid, "encoder deregistered after exit");
            }
        });

        Ok(StartOutcome::Started)
    }

    /// Deregister `stream_id` and ask its process to terminate.
    ///
    /// The entry is removed synchronously with this call, before the
    /// process has actually died; `status` reports `Stopped` immediately.
    /// Stopping an absent id is a no-op.
    pub async fn stop(&self, stream_id: i64) -> Result<(), ProcessError> {
        let removed = self.registry.lock().await.remove(&stream_id);
        let Some(process) = removed else {
            debug!(stream_id, "stop for unregistered stream, no-op");
            return Ok(());
        };

        info!(
            stream_id,
            pid = process.pid,
            uptime_secs = now_secs().saturating_sub(process.started_at),
            "stopping encoder"
        );
        request_exit(process.pid)
    }

    /// Point-in-time status snapshot: `Running` iff the id is registered.
    pub async fn status(&self, stream_id: i64) -> StreamStatus {
        if self.registry.lock().await.contains_key(&stream_id) {
            StreamStatus::Running
        } else {
            StreamStatus::Stopped
        }
    }

    /// IDs of all currently registered streams.
    pub async fn running_ids(&self) -> Vec<i64> {
        self.registry.lock().await.keys().copied().collect()
    }

    /// Stop every registered stream. Used on server shutdown.
    pub async fn shutdown(&self) {
        let ids = self.running_ids().await;
        if !ids.is_empty() {
            info!(count = ids.len(), "shutting down encoder supervisor");
        }
        for id in ids {
            if let Err(e) = self.stop(id).await {
                warn!(stream_id = id, error = %e, "failed to stop encoder during shutdown");
            }
        }
    }
}

#[async_trait]
impl EncoderRunner for EncoderSupervisor {
    async fn start(&self, spec: LaunchSpec) -> Result<StartOutcome, ProcessError> {
        Self::start(self, spec).await
    }

    async fn stop(&self, stream_id: i64) -> Result<(), ProcessError> {
        Self::stop(self, stream_id).await
    }

    async fn status(&self, stream_id: i64) -> StreamStatus {
        Self::status(self, stream_id).await
    }

    async fn running_ids(&self) -> Vec<i64> {
        Self::running_ids(self).await
    }

    async fn shutdown(&self) {
        Self::shutdown(self).await;
    }
}

/// Forward each line of an encoder output stream into tracing, tagged
/// with the stream id. The task ends when the pipe closes.
fn forward_output_lines<R>(stream_id: i64, channel: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: "castctl.encoder", stream_id, channel, "{line}");
        }
        debug!(stream_id, channel, "output reader task exiting");
    });
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn supervisor() -> EncoderSupervisor {
        EncoderSupervisor::new("ffmpeg", "/tmp")
    }

    fn long_running() -> Command {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        cmd
    }

    fn short_lived() -> Command {
        let mut cmd = Command::new("echo");
        cmd.arg("done");
        cmd
    }

    /// Poll until the stream reports `Stopped`, failing after ~2s.
    async fn wait_until_stopped(sup: &EncoderSupervisor, id: i64) {
        for _ in 0..40 {
            if sup.status(id).await == StreamStatus::Stopped {
                return;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("stream {id} never reported stopped");
    }

    #[tokio::test]
    async fn status_is_stopped_for_unknown_stream() {
        assert_eq!(supervisor().status(7).await, StreamStatus::Stopped);
    }

    #[tokio::test]
    async fn start_registers_and_is_idempotent() {
        let sup = supervisor();
        let first = sup.launch(1, long_running()).await.unwrap();
        assert_eq!(first, StartOutcome::Started);
        assert_eq!(sup.status(1).await, StreamStatus::Running);

        // Second start for the same id: no error, no second process.
        let second = sup.launch(1, long_running()).await.unwrap();
        assert_eq!(second, StartOutcome::AlreadyRunning);
        assert_eq!(sup.running_ids().await, vec![1]);

        sup.stop(1).await.unwrap();
    }

    #[tokio::test]
    async fn stop_deregisters_before_process_death() {
        let sup = supervisor();
        sup.launch(2, long_running()).await.unwrap();
        sup.stop(2).await.unwrap();
        // Immediately stopped, regardless of whether the process has
        // actually exited yet.
        assert_eq!(sup.status(2).await, StreamStatus::Stopped);
    }

    #[tokio::test]
    async fn stop_of_absent_stream_is_noop() {
        let sup = supervisor();
        sup.stop(42).await.unwrap();
        assert!(sup.running_ids().await.is_empty());
    }

    #[tokio::test]
    async fn natural_exit_deregisters_without_stop() {
        let sup = supervisor();
        sup.launch(3, short_lived()).await.unwrap();
        wait_until_stopped(&sup, 3).await;
    }

    #[tokio::test]
    async fn late_exit_observation_after_stop_is_noop() {
        let sup = supervisor();
        sup.launch(4, long_running()).await.unwrap();
        sup.stop(4).await.unwrap();
        // The exit observer fires after the entry is already gone; give it
        // time to do so and verify nothing resurrects or panics.
        sleep(Duration::from_millis(300)).await;
        assert_eq!(sup.status(4).await, StreamStatus::Stopped);
    }

    #[tokio::test]
    async fn spawn_failure_leaves_no_entry() {
        let sup = EncoderSupervisor::new("castctl-no-such-encoder-binary", "/tmp");
        let spec = LaunchSpec {
            stream_id: 5,
            video: "a.mp4".to_string(),
            rtmp_url: "rtmp://x".to_string(),
            stream_key: "key".to_string(),
            looping: false,
            duration_secs: None,
        };
        let err = sup.start(spec).await.unwrap_err();
        assert!(matches!(err, ProcessError::SpawnFailed(_)));
        assert_eq!(sup.status(5).await, StreamStatus::Stopped);
    }

    #[tokio::test]
    async fn concurrent_starts_spawn_exactly_one_process() {
        let sup = Arc::new(supervisor());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let sup = Arc::clone(&sup);
            handles.push(tokio::spawn(
                async move { sup.launch(6, long_running()).await },
            ));
        }

        let mut started = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == StartOutcome::Started {
                started += 1;
            }
        }
        assert_eq!(started, 1);
        assert_eq!(sup.running_ids().await, vec![6]);

        sup.stop(6).await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_all_streams() {
        let sup = supervisor();
        sup.launch(10, long_running()).await.unwrap();
        sup.launch(11, long_running()).await.unwrap();
        assert_eq!(sup.running_ids().await.len(), 2);

        sup.shutdown().await;
        assert!(sup.running_ids().await.is_empty());
    }
}
