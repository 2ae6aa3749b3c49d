//! Core domain types and port definitions for castctl.
//!
//! This crate holds the domain model (streams, users) and the trait
//! abstractions the rest of the system is wired through. It has no
//! knowledge of sqlx, axum, or OS processes; those live behind the ports.

pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{NewStream, NewUser, Stream, StreamStatus, StreamUpdate, User};
pub use ports::{
    CoreError, EncoderRunner, LaunchSpec, ProcessError, Repos, RepositoryError, StartOutcome,
    StreamRepository, UserRepository,
};
