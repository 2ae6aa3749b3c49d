//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No process/filesystem implementation details
//! - Traits are minimal and CRUD-focused for repositories
//! - Intent-based methods for the encoder runner (not implementation-leaking)

pub mod encoder_runner;
pub mod stream_repository;
pub mod user_repository;

use std::sync::Arc;
use thiserror::Error;

pub use encoder_runner::{EncoderRunner, LaunchSpec, StartOutcome};
pub use stream_repository::StreamRepository;
pub use user_repository::UserRepository;

/// Container for all repository trait objects.
///
/// Wired once at bootstrap and handed to adapters, so handlers never see
/// concrete repository types.
#[derive(Clone)]
pub struct Repos {
    /// Stream repository for CRUD operations on stream configurations.
    pub streams: Arc<dyn StreamRepository>,
    /// User repository for account lookup and registration.
    pub users: Arc<dyn UserRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(streams: Arc<dyn StreamRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { streams, users }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g. sqlx
/// errors) so callers deal with stable, meaningful categories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same unique key already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The underlying storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A value could not be (de)serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from the encoder process runner.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The encoder binary could not be launched. The registry gains no
    /// entry when this is returned; the stream is definitively not running.
    #[error("Failed to spawn encoder: {0}")]
    SpawnFailed(String),

    /// Sending the termination request to a live process failed.
    #[error("Failed to signal encoder: {0}")]
    SignalFailed(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Top-level error type aggregating the error categories of the core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
