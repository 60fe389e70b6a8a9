//! Profile rendering for the terminal shell

use async_trait::async_trait;
use mbxd_common::services::{ProfileService, User};
use mbxd_common::validation::unescape_html;
use mbxd_common::Result;
use std::fmt::{self, Write};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

use crate::page::{PageLauncher, ProfilePageLocator};

#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Render the user's profile; returns the text to display
    async fn show_profile(&self, user: &User) -> Result<String>;
}

/// Prints a profile block and opens the profile HTML page
pub struct ConsoleProfileProvider {
    profiles: ProfileService,
    locator: ProfilePageLocator,
    launcher: PageLauncher,
    /// Located page, reused across refreshes while it still exists
    page_path: Mutex<Option<PathBuf>>,
}

impl ConsoleProfileProvider {
    pub fn new(profiles: ProfileService, locator: ProfilePageLocator, launcher: PageLauncher) -> Self {
        Self {
            profiles,
            locator,
            launcher,
            page_path: Mutex::new(None),
        }
    }

    async fn page_path(&self) -> Result<PathBuf> {
        let mut cached = self.page_path.lock().await;
        if let Some(path) = cached.as_ref().filter(|p| p.is_file()) {
            return Ok(path.clone());
        }

        let path = self.locator.locate()?;
        debug!("Using profile page {}", path.display());
        *cached = Some(path.clone());
        Ok(path)
    }
}

#[async_trait]
impl ProfileProvider for ConsoleProfileProvider {
    async fn show_profile(&self, user: &User) -> Result<String> {
        let songs = self.profiles.get_top_song_layout(user.id).await?;
        let albums = self.profiles.get_top_album_layout(user.id).await?;

        let mut out = String::new();
        write_block(&mut out, user, &songs, &albums)
            .map_err(|e| mbxd_common::Error::Internal(format!("Failed to render profile: {}", e)))?;

        match self.page_path().await {
            Ok(path) => {
                let opened = self.launcher.open(&path).await;
                out.push_str(&format!("{}\n", opened));
            }
            Err(e) => out.push_str(&format!("Unable to open profile HTML: {}\n", e)),
        }

        Ok(out)
    }
}

fn write_block(out: &mut String, user: &User, songs: &[String], albums: &[String]) -> fmt::Result {
    writeln!(out, "----- PROFILE -----")?;
    writeln!(out, "Logged in as: {}", user.username)?;
    if !user.public_bio.is_empty() {
        writeln!(out, "Bio: {}", unescape_html(&user.public_bio))?;
    }
    if !user.location.is_empty() {
        writeln!(out, "Location: {}", user.location)?;
    }
    if !user.genres.is_empty() {
        writeln!(out, "Genres: {}", user.genres.join(", "))?;
    }
    write_layout(out, "Top songs", songs)?;
    write_layout(out, "Top albums", albums)?;
    writeln!(out, "-------------------")
}

fn write_layout(out: &mut String, heading: &str, slots: &[String]) -> fmt::Result {
    writeln!(out, "{}:", heading)?;
    for (i, slot) in slots.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, slot)?;
    }
    Ok(())
}
