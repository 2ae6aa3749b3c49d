//! Axum web adapter for castctl.
//!
//! Translates REST calls into repository and supervisor operations. All
//! wiring happens in [`bootstrap`]; handlers only ever see the shared
//! [`state::AppState`].

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
