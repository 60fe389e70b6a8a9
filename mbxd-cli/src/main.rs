//! mbxd-cli - Musicboxd terminal shell
//!
//! Log in or create an account, then view the profile. Shares the database
//! with mbxd-web.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mbxd_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use mbxd_common::db::init::init_database;
use mbxd_common::logging::init_tracing;
use mbxd_common::Services;
use mbxd_cli::{
    ConsoleProfileProvider, PageLauncher, ProfilePageLocator, ServiceAuthProvider, Shell,
};
use tokio::io::BufReader;
use tracing::{debug, info};

/// Command-line arguments for mbxd-cli
#[derive(Parser, Debug)]
#[command(name = "mbxd-cli")]
#[command(about = "Musicboxd terminal shell")]
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

    /// Print the profile page path instead of launching a browser
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default(args.config.as_deref());

    init_tracing(&config.logging).context("Failed to initialize logging")?;
    info!("Starting Musicboxd shell (mbxd-cli) v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = RootFolderResolver::new("mbxd-cli")
        .with_cli_arg(args.root_folder)
        .with_toml_config(&config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path_or(args.database.as_deref().or(config.database_path.as_deref()));
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;
    let services = Services::new(pool).await.context("Failed to load runtime settings")?;

    let locator = ProfilePageLocator::new(config.profile.page, config.profile.asset_dir);
    let launcher = PageLauncher::new(config.profile.open_browser && !args.no_browser);

    let mut shell = Shell::new(
        ServiceAuthProvider::new(services.auth.clone()),
        ConsoleProfileProvider::new(services.profile.clone(), locator, launcher),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    let exit = shell.run().await?;
    debug!("Shell ended: {:?}", exit);
    Ok(())
}
