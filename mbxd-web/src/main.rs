//! mbxd-web - Musicboxd HTTP API server
//!
//! Zero-config startup: the root folder and database are created on first
//! run, runtime policy defaults are written to the settings table.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mbxd_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use mbxd_common::db::init::init_database;
use mbxd_common::logging::init_tracing;
use mbxd_common::Services;
use mbxd_web::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for mbxd-web
#[derive(Parser, Debug)]
#[command(name = "mbxd-web")]
#[command(about = "Musicboxd HTTP API")]
#[command(version)]
struct Args {
    /// Root folder holding the database (falls back to $MUSICBOXD_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Database file (defaults to <root>/musicboxd.db)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default(args.config.as_deref());

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    // Build identification first so startup problems are attributable
    info!("Starting Musicboxd HTTP API (mbxd-web) v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = RootFolderResolver::new("mbxd-web")
        .with_cli_arg(args.root_folder)
        .with_toml_config(&config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path_or(args.database.as_deref().or(config.database_path.as_deref()));
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let services = Services::new(pool).await.context("Failed to load runtime settings")?;
    let app = build_router(AppState::new(services));

    let host = args.host.unwrap_or(config.web.host);
    let port = args.port.unwrap_or(config.web.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("mbxd-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
