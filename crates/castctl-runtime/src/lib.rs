//! Encoder process supervision for castctl.
//!
//! This crate owns everything that touches OS processes: building ffmpeg
//! invocations, spawning and registering encoder subprocesses, forwarding
//! their output into tracing, observing their exits, and requesting
//! graceful termination.

pub mod encoder;

pub use encoder::{EncoderSupervisor, launch_args};
