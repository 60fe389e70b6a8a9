//! Locating and opening the profile HTML page
//!
//! The page is looked up next to the working directory first, then in the
//! configured asset directory. Pages compiled into the binary are written
//! to a temp file as a last resort.

use mbxd_common::config::DEFAULT_PROFILE_PAGE;
use mbxd_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

// Embed static files at compile time
const PROFILE_PAGE_HTML: &str = include_str!("../static/profile_index.html");

fn embedded_page(name: &str) -> Option<&'static str> {
    match name {
        DEFAULT_PROFILE_PAGE => Some(PROFILE_PAGE_HTML),
        _ => None,
    }
}

/// Finds the profile page on disk or in the embedded assets
#[derive(Debug, Clone)]
pub struct ProfilePageLocator {
    page: String,
    asset_dir: Option<PathBuf>,
    base_dir: PathBuf,
}

impl ProfilePageLocator {
    pub fn new(page: impl Into<String>, asset_dir: Option<PathBuf>) -> Self {
        Self {
            page: page.into(),
            asset_dir,
            base_dir: PathBuf::from("."),
        }
    }

    /// Resolve relative candidates against `dir` instead of the working directory
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    /// Filesystem locations in lookup order
    pub fn candidates(&self) -> Vec<PathBuf> {
        let page = self.page.as_str();
        let mut candidates: Vec<PathBuf> = [
            PathBuf::from(page),
            Path::new(".").join(page),
            Path::new("src").join(page),
            Path::new("resources").join(page),
            Path::new("..").join(page),
        ]
        .into_iter()
        .map(|p| self.base_dir.join(p))
        .collect();

        if let Some(dir) = &self.asset_dir {
            candidates.push(dir.join(page));
        }
        candidates
    }

    /// First existing candidate, else the embedded copy written to a temp file
    pub fn locate(&self) -> Result<PathBuf> {
        for candidate in self.candidates() {
            if candidate.is_file() {
                debug!("Profile page found at {}", candidate.display());
                return Ok(candidate.canonicalize()?);
            }
        }

        let contents = embedded_page(&self.page).ok_or_else(|| {
            Error::not_found(format!(
                "HTML file not found in filesystem or embedded assets: {}",
                self.page
            ))
        })?;
        write_temp_page(contents)
    }
}

fn write_temp_page(contents: &str) -> Result<PathBuf> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("musicboxd_profile_")
        .suffix(".html")
        .tempfile()?;
    file.write_all(contents.as_bytes())?;

    let (_, path) = file.keep().map_err(|e| Error::Io(e.error))?;
    debug!("Embedded profile page written to {}", path.display());
    Ok(path)
}

/// How a page was handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOpened {
    /// Passed to the platform opener
    Browser(PathBuf),
    /// No opener available; the user opens the path themselves
    Manual(PathBuf),
}

impl std::fmt::Display for PageOpened {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageOpened::Browser(path) => write!(f, "Opened in browser: {}", path.display()),
            PageOpened::Manual(path) => {
                write!(f, "Open this file in a browser: {}", path.display())
            }
        }
    }
}

/// Launches the system browser on a local file
#[derive(Debug, Clone, Copy)]
pub struct PageLauncher {
    open_browser: bool,
}

impl PageLauncher {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }

    /// Hand `path` to the platform opener; the opener is reaped in the background
    pub async fn open(&self, path: &Path) -> PageOpened {
        if !self.open_browser {
            return PageOpened::Manual(path.to_path_buf());
        }

        match opener_command(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(mut child) => {
                info!("Opened {} in browser", path.display());
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => warn!("Browser opener exited with {}", status),
                        Ok(_) => {}
                        Err(e) => warn!("Failed to wait for browser opener: {}", e),
                    }
                });
                PageOpened::Browser(path.to_path_buf())
            }
            Err(e) => {
                warn!("No browser opener available: {}", e);
                PageOpened::Manual(path.to_path_buf())
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
