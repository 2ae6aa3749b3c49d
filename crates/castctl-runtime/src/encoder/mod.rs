//! Encoder subprocess management.
//!
//! # Structure
//!
//! - [`launch_args`] - pure ffmpeg argument construction
//! - [`EncoderSupervisor`] - registry of live encoder processes keyed by
//!   stream id, with output forwarding and exit observation
//! - `signal` - graceful termination requests by pid

mod launch;
mod signal;
mod supervisor;

pub use launch::launch_args;
pub use supervisor::EncoderSupervisor;
