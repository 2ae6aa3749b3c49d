//! Graceful termination requests by pid.
//!
//! The supervisor deregisters a stream before its process has actually
//! exited, so at stop time only the recorded pid is available - the
//! `Child` handle lives in the exit-observer task, which also reaps the
//! process once it dies.

use castctl_core::ProcessError;

/// Ask a process to shut down cleanly (SIGTERM on unix).
///
/// A process that is already gone is not an error. There is deliberately
/// no SIGKILL escalation here: an encoder that ignores SIGTERM keeps
/// running until it exits on its own, and the exit observer logs that
/// eventual exit.
#[cfg(unix)]
pub fn request_exit(pid: u32) -> Result<(), ProcessError> {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        // Already exited between deregistration and the signal
        Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(ProcessError::SignalFailed(e.to_string())),
    }
}

#[cfg(not(unix))]
pub fn request_exit(_pid: u32) -> Result<(), ProcessError> {
    Err(ProcessError::SignalFailed(
        "graceful termination is only supported on unix".to_string(),
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn request_exit_tolerates_missing_process() {
        // PID that is very unlikely to exist
        assert!(request_exit(999_999).is_ok());
    }
}
