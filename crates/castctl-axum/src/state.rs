//! Shared application state type.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// An Arc-wrapped [`AxumContext`] containing the repositories, the encoder
/// supervisor, and the session store.
pub type AppState = Arc<AxumContext>;
