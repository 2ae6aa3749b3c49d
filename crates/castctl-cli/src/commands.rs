//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server and encoder supervisor
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Port for the HTTP server
    #[arg(long, env = "CASTCTL_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Path to the SQLite database file
    #[arg(long, env = "CASTCTL_DATABASE", default_value = "castctl.db")]
    pub database: PathBuf,

    /// Directory holding the source video files
    #[arg(long, env = "CASTCTL_MEDIA_DIR", default_value = "videos")]
    pub media_dir: PathBuf,

    /// Path to the ffmpeg binary (a bare name resolves through PATH)
    #[arg(long, env = "CASTCTL_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Secret code gating account registration and password changes
    #[arg(long, env = "CASTCTL_SECRET_CODE")]
    pub secret_code: String,

    /// Google Drive API key; Drive import stays disabled without it
    #[arg(long, env = "GOOGLE_API_KEY")]
    pub google_api_key: Option<String>,

    /// Directory with static assets for the browser UI
    #[arg(long, env = "CASTCTL_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Serve the API without any static frontend
    #[arg(long)]
    pub api_only: bool,

    /// Allowed CORS origins (default: allow all)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}
