//! roadmap-server - learning-path recommendation service
//!
//! Serves the questionnaire, stores answers in SQLite and generates
//! learning-path recommendations from them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use roadmap_common::config::{ensure_directory_exists, ServerConfig, TomlConfig};
use roadmap_common::db::init_database;
use roadmap_server::db::questions;
use roadmap_server::{build_router, AppState};
use tracing::{error, info};

/// Command-line arguments for roadmap-server
#[derive(Parser, Debug)]
#[command(name = "roadmap-server")]
#[command(about = "Questionnaire and learning-path recommendation service")]
#[command(version)]
struct Args {
    /// Folder holding the database (falls back to ROADMAP_ROOT_FOLDER, the
    /// config file, then the platform data directory)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "ROADMAP_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ROADMAP_PORT")]
    port: Option<u16>,

    /// Explicit config file path
    #[arg(short, long, env = "ROADMAP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The config file is read before tracing exists so its log level can apply
    let toml_config = TomlConfig::load_or_default(args.config.as_deref());
    let config = ServerConfig::resolve(
        args.root_folder.as_deref(),
        args.bind.as_deref(),
        args.port,
        &toml_config,
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "roadmap_server={0},roadmap_common={0},tower_http={0}",
                    config.log_level
                )
                .into()
            }),
        )
        .init();

    info!(
        "Starting roadmap-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Root folder: {}", config.root_folder.display());
    ensure_directory_exists(&config.root_folder)?;

    let db_path = config.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("Database ready: {}", db_path.display());
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let seeded = questions::seed_if_empty(&pool)
        .await
        .context("Failed to seed questionnaire")?;
    if seeded == 0 {
        info!("Questionnaire already present");
    }

    let app = build_router(AppState::new(pool));

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("roadmap-server listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
