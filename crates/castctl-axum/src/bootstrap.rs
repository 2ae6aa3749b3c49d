//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter: the database pool, the repositories, the encoder
//! supervisor, and the session store are all instantiated here and handed
//! to handlers through [`crate::state::AppState`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use castctl_core::{EncoderRunner, Repos};
use castctl_db::{CoreFactory, setup_database};
use castctl_runtime::EncoderSupervisor;

use crate::auth::SessionStore;
use crate::routes::create_router;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// Directory holding the source video files.
    pub media_dir: PathBuf,
    /// Path to the ffmpeg binary (a bare name resolves through PATH).
    pub encoder_path: PathBuf,
    /// Secret code gating registration and password changes.
    pub secret_code: String,
    /// Google Drive API key; Drive import is disabled when unset.
    pub drive_api_key: Option<String>,
    /// Optional path to static assets for the browser UI.
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
}

/// Application context for the Axum adapter.
///
/// Holds all initialized services for the web server.
pub struct AxumContext {
    /// Repository container.
    pub repos: Repos,
    /// Encoder supervisor as trait object.
    pub runner: Arc<dyn EncoderRunner>,
    /// In-memory session store.
    pub sessions: SessionStore,
    /// Directory holding the source video files.
    pub media_dir: PathBuf,
    /// Optional static asset directory.
    pub static_dir: Option<PathBuf>,
    /// Secret code gating registration and password changes.
    pub secret_code: String,
    /// Google Drive API key, if configured.
    pub drive_api_key: Option<String>,
    /// Shared HTTP client for outbound requests (Drive import).
    pub http: reqwest::Client,
}

/// Bootstrap all services for the web server.
pub async fn bootstrap(config: ServerConfig) -> Result<AxumContext> {
    info!(
        database_path = %config.database_path.display(),
        media_dir = %config.media_dir.display(),
        encoder_path = %config.encoder_path.display(),
        "bootstrap resolved paths"
    );

    // The media dir must exist before uploads or encoder starts hit it.
    // Canonicalized so the encoder always receives absolute input paths,
    // whatever directory the server was started from.
    std::fs::create_dir_all(&config.media_dir)?;
    let media_dir = std::fs::canonicalize(&config.media_dir)?;

    // 1. Database pool with schema setup
    let pool = setup_database(&config.database_path).await?;
    let repos = CoreFactory::build_repos(pool);

    // 2. Encoder supervisor: the single process registry for this server
    let runner: Arc<dyn EncoderRunner> = Arc::new(EncoderSupervisor::new(
        config.encoder_path.clone(),
        media_dir.clone(),
    ));

    Ok(AxumContext {
        repos,
        runner,
        sessions: SessionStore::new(),
        media_dir,
        static_dir: config.static_dir,
        secret_code: config.secret_code,
        drive_api_key: config.drive_api_key,
        http: reqwest::Client::new(),
    })
}

/// Bootstrap and serve until a shutdown signal arrives, then stop all
/// supervised encoders.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let port = config.port;
    let cors = config.cors.clone();

    let ctx = bootstrap(config).await?;
    let runner = Arc::clone(&ctx.runner);
    let app = create_router(ctx, &cors);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "castctl listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Encoders must not outlive the control plane unobserved
    runner.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
