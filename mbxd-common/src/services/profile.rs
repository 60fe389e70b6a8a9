//! Profiles: public details plus top songs and top albums

use crate::services::top_chart::{ChartEntry, ChartKind, TopChartTracker};
use crate::services::users::{self, User};
use crate::validation::{clean_text, is_valid_hex_color, same_text, sanitize_text};
use crate::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

pub const MSG_INVALID_THEME_COLOR: &str = "Invalid theme color.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSongEntry {
    pub song_name: String,
    pub artist_name: String,
}

impl TopSongEntry {
    pub fn new(song_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            song_name: song_name.into(),
            artist_name: artist_name.into(),
        }
    }
}

impl From<TopSongEntry> for ChartEntry {
    fn from(e: TopSongEntry) -> Self {
        ChartEntry::new(e.song_name, e.artist_name)
    }
}

impl From<ChartEntry> for TopSongEntry {
    fn from(e: ChartEntry) -> Self {
        TopSongEntry::new(e.title, e.artist_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopAlbumEntry {
    pub album_name: String,
    pub artist_name: String,
}

impl TopAlbumEntry {
    pub fn new(album_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            album_name: album_name.into(),
            artist_name: artist_name.into(),
        }
    }
}

impl From<TopAlbumEntry> for ChartEntry {
    fn from(e: TopAlbumEntry) -> Self {
        ChartEntry::new(e.album_name, e.artist_name)
    }
}

impl From<ChartEntry> for TopAlbumEntry {
    fn from(e: ChartEntry) -> Self {
        TopAlbumEntry::new(e.title, e.artist_name)
    }
}

/// Portable copy of a user's charts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileExport {
    #[serde(default)]
    pub top_songs: Vec<TopSongEntry>,
    #[serde(default)]
    pub top_albums: Vec<TopAlbumEntry>,
}

/// Everything shown on a profile page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub public_bio: String,
    pub location: String,
    pub genres: Vec<String>,
    pub theme_color: String,
    pub top_songs: Vec<TopSongEntry>,
    pub top_albums: Vec<TopAlbumEntry>,
}

/// Partial profile edit; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub public_bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub theme_color: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    pool: SqlitePool,
    songs: TopChartTracker,
    albums: TopChartTracker,
}

impl ProfileService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            songs: TopChartTracker::new(pool.clone(), ChartKind::Songs),
            albums: TopChartTracker::new(pool.clone(), ChartKind::Albums),
            pool,
        }
    }

    // ---- top songs ----

    /// Returns the new entry's position
    pub async fn add_top_song(&self, user_id: Uuid, entry: TopSongEntry) -> Result<usize> {
        self.songs.add(user_id, entry.into()).await
    }

    pub async fn edit_top_song(&self, user_id: Uuid, index: usize, entry: TopSongEntry) -> Result<()> {
        self.songs.edit(user_id, index, entry.into()).await
    }

    pub async fn delete_top_song(&self, user_id: Uuid, index: usize) -> Result<TopSongEntry> {
        self.songs.delete(user_id, index).await.map(Into::into)
    }

    pub async fn reorder_top_songs(&self, user_id: Uuid, from: usize, to: usize) -> Result<()> {
        self.songs.reorder(user_id, from, to).await
    }

    pub async fn get_top_songs(&self, user_id: Uuid) -> Result<Vec<TopSongEntry>> {
        let entries = self.songs.entries(user_id).await?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    /// Five slots, unused ones shown as "Empty"
    pub async fn get_top_song_layout(&self, user_id: Uuid) -> Result<Vec<String>> {
        self.songs.layout(user_id).await
    }

    // ---- top albums ----

    pub async fn add_top_album(&self, user_id: Uuid, entry: TopAlbumEntry) -> Result<usize> {
        self.albums.add(user_id, entry.into()).await
    }

    pub async fn edit_top_album(&self, user_id: Uuid, index: usize, entry: TopAlbumEntry) -> Result<()> {
        self.albums.edit(user_id, index, entry.into()).await
    }

    pub async fn delete_top_album(&self, user_id: Uuid, index: usize) -> Result<TopAlbumEntry> {
        self.albums.delete(user_id, index).await.map(Into::into)
    }

    pub async fn reorder_top_albums(&self, user_id: Uuid, from: usize, to: usize) -> Result<()> {
        self.albums.reorder(user_id, from, to).await
    }

    pub async fn get_top_albums(&self, user_id: Uuid) -> Result<Vec<TopAlbumEntry>> {
        let entries = self.albums.entries(user_id).await?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    /// Four slots, unused ones shown as "Empty"
    pub async fn get_top_album_layout(&self, user_id: Uuid) -> Result<Vec<String>> {
        self.albums.layout(user_id).await
    }

    // ---- export / import ----

    pub async fn export_profile(&self, user_id: Uuid) -> Result<ProfileExport> {
        Ok(ProfileExport {
            top_songs: self.get_top_songs(user_id).await?,
            top_albums: self.get_top_albums(user_id).await?,
        })
    }

    /// Replace both charts with `data`
    ///
    /// Entries beyond a chart's capacity are dropped. Nothing is written
    /// unless both charts are valid.
    pub async fn import_profile(&self, user_id: Uuid, data: ProfileExport) -> Result<ProfileExport> {
        let songs = self
            .songs
            .prepare(data.top_songs.into_iter().map(Into::into).collect())?;
        let albums = self
            .albums
            .prepare(data.top_albums.into_iter().map(Into::into).collect())?;
        let user = self.load_user(user_id).await?;

        let mut tx = self.pool.begin().await?;
        self.songs.store(&mut tx, user_id, &songs).await?;
        self.albums.store(&mut tx, user_id, &albums).await?;
        tx.commit().await?;

        info!(
            "Imported {} songs and {} albums for '{}'",
            songs.len(),
            albums.len(),
            user.username
        );
        self.export_profile(user_id).await
    }

    // ---- profile details ----

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Profile> {
        let user = self.load_user(user_id).await?;
        Ok(Profile {
            top_songs: self.get_top_songs(user_id).await?,
            top_albums: self.get_top_albums(user_id).await?,
            username: user.username,
            public_bio: user.public_bio,
            location: user.location,
            genres: user.genres,
            theme_color: user.theme_color,
        })
    }

    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Profile> {
        let mut user = self.load_user(user_id).await?;

        if let Some(color) = update.theme_color {
            let color = color.trim();
            if !is_valid_hex_color(color) {
                return Err(Error::validation(MSG_INVALID_THEME_COLOR));
            }
            user.theme_color = color.to_lowercase();
        }
        if let Some(bio) = update.public_bio {
            user.public_bio = sanitize_text(&bio);
        }
        if let Some(location) = update.location {
            user.location = clean_text(&location);
        }
        if let Some(genres) = update.genres {
            let mut cleaned: Vec<String> = Vec::new();
            for genre in genres.iter().map(|g| clean_text(g)).filter(|g| !g.is_empty()) {
                if !cleaned.iter().any(|c| same_text(c, &genre)) {
                    cleaned.push(genre);
                }
            }
            user.genres = cleaned;
        }

        let genres = serde_json::to_string(&user.genres)
            .map_err(|e| Error::Internal(format!("Failed to encode genres: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE users
            SET public_bio = ?, location = ?, genres = ?, theme_color = ?, updated_at = ?
            WHERE guid = ?
            "#,
        )
        .bind(&user.public_bio)
        .bind(&user.location)
        .bind(genres)
        .bind(&user.theme_color)
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        info!("Updated profile of '{}'", user.username);
        self.get_profile(user_id).await
    }

    async fn load_user(&self, user_id: Uuid) -> Result<User> {
        users::load_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| Error::not_found("User not found."))
    }
}
