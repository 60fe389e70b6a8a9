//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Runtime policy
//! (session lifetime, lockout, search limits) lives in the database
//! `settings` table, see [`crate::db::settings`].
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `MUSICBOXD_ROOT_FOLDER`
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "MUSICBOXD_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "musicboxd.db";

/// Default profile page looked up by the terminal shell
pub const DEFAULT_PROFILE_PAGE: &str = "profile_index.html";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Folder holding the database (overridden by CLI and environment)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit database path (defaults to `<root_folder>/musicboxd.db`)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub profile: ProfilePageConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Profile page lookup used by the terminal shell
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePageConfig {
    /// Page file name, searched relative to the working directory
    #[serde(default = "default_profile_page")]
    pub page: String,

    /// Extra directory searched after the relative candidates
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,

    /// Launch the system browser (otherwise only print the path)
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

impl Default for ProfilePageConfig {
    fn default() -> Self {
        Self {
            page: default_profile_page(),
            asset_dir: None,
            open_browser: default_open_browser(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_profile_page() -> String {
    DEFAULT_PROFILE_PAGE.to_string()
}

fn default_open_browser() -> bool {
    true
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load config, falling back to defaults when the file is missing or invalid
    ///
    /// Missing configuration never aborts startup.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using defaults");
                return Self::default();
            }
        };

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} - using defaults", e);
                Self::default()
            }
        }
    }
}

/// Platform config file: `<config_dir>/musicboxd/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("musicboxd").join("config.toml"))
}

/// Compiled-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: get_default_root_folder(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

/// Get OS-dependent default root folder path
pub fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/musicboxd
        dirs::data_local_dir()
            .map(|d| d.join("musicboxd"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/musicboxd"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/musicboxd
        dirs::data_dir()
            .map(|d| d.join("musicboxd"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/musicboxd"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\musicboxd
        dirs::data_local_dir()
            .map(|d| d.join("musicboxd"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\musicboxd"))
    } else {
        PathBuf::from("./musicboxd_data")
    }
}

/// Resolves the root folder following the 4-tier priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder: {} (command line)", self.module_name, path.display());
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder: {} ({})", self.module_name, path, ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_root {
            info!("[{}] Root folder: {} (config file)", self.module_name, path.display());
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        let path = CompiledDefaults::for_current_platform().root_folder;
        info!("[{}] Root folder: {} (default)", self.module_name, path.display());
        path
    }
}

/// Creates the root folder and derives file locations inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    /// Database path, honouring an explicit override
    pub fn database_path_or(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.database_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        assert_eq!(default_port(), 5780);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            root_folder = "/srv/musicboxd"

            [web]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/srv/musicboxd")));
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.profile.page, DEFAULT_PROFILE_PAGE);
        assert!(config.profile.open_browser);
    }
}
