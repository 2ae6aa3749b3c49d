//! CLI entry point - the composition root.
//!
//! All wiring happens in `castctl_axum::bootstrap`; this binary only
//! parses arguments and hands a `ServerConfig` over.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use castctl_axum::{CorsConfig, ServerConfig, start_server};
use castctl_cli::{Cli, Commands, ServeArgs};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn server_config(args: ServeArgs) -> ServerConfig {
    let cors = if args.cors_origins.is_empty() {
        CorsConfig::AllowAll
    } else {
        CorsConfig::AllowOrigins(args.cors_origins)
    };

    let static_dir = if args.api_only {
        None
    } else {
        args.static_dir.or_else(|| {
            // Default frontend build location, when present
            let candidate = std::path::PathBuf::from("web_ui/dist");
            candidate.join("index.html").exists().then_some(candidate)
        })
    };

    ServerConfig {
        port: args.port,
        database_path: args.database,
        media_dir: args.media_dir,
        encoder_path: args.ffmpeg,
        secret_code: args.secret_code,
        drive_api_key: args.google_api_key,
        static_dir,
        cors,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve(args) => {
            let config = server_config(args);
            tracing::info!(port = config.port, "starting castctl");
            start_server(config).await?;
        }
    }

    Ok(())
}
