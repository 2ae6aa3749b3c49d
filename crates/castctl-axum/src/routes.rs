//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Upload size cap for video files.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// All authenticated API routes, without the `/api` prefix (nested by the
/// caller).
///
/// # Path Parameter Syntax
/// Axum 0.8 uses brace syntax for path parameters: `{id}`, `{filename}`.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Session identity
        .route("/me", get(handlers::auth::me))
        // Streams API
        .route(
            "/streams",
            get(handlers::streams::list).post(handlers::streams::create),
        )
        .route(
            "/streams/{id}",
            put(handlers::streams::update).delete(handlers::streams::remove),
        )
        .route("/streams/{id}/start", post(handlers::streams::start))
        .route("/streams/{id}/stop", post(handlers::streams::stop))
        // Video library API
        .route("/videos", get(handlers::videos::list))
        .route(
            "/videos/upload",
            post(handlers::videos::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/videos/drive", post(handlers::videos::drive_import))
        .route(
            "/videos/{filename}",
            put(handlers::videos::rename).delete(handlers::videos::remove),
        )
}

/// Unauthenticated account routes.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/auth/change-password",
            post(handlers::auth::change_password),
        )
}

async fn health() -> &'static str {
    "OK"
}

/// Create the main Axum router with all routes and middleware.
pub fn create_router(ctx: AxumContext, cors: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);

    let mut router = Router::new()
        .route("/health", get(health))
        .merge(auth_routes())
        .nest("/api", api_routes())
        // Raw video files, served for preview in the UI
        .nest_service("/videos", ServeDir::new(&state.media_dir));

    if let Some(static_dir) = &state.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(build_cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
