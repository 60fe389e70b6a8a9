//! Album catalog
//!
//! Albums that reviews point at. Lists and top charts store titles only and
//! do not require a catalog entry.

use crate::db::settings::SearchPolicy;
use crate::validation::{contains_pattern, is_blank};
use crate::{uuid_utils, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

pub const MSG_INVALID_ALBUM_NAME: &str = "Please enter a valid album name.";
pub const MSG_BLANK_ARTIST: &str = "Artist name cannot be blank.";
pub const MSG_ALBUM_NOT_FOUND: &str = "Album not found.";
pub const MSG_ADD_FAILED: &str = "Unable to add album.";
pub const MSG_LOOKUP_FAILED: &str = "Unable to retrieve data.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Album {
    pub id: Uuid,
    pub title: String,
    pub artist_name: String,
    pub release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

fn album_from_row(row: &SqliteRow) -> Result<Album> {
    let guid: String = row.try_get("guid")?;
    Ok(Album {
        id: uuid_utils::parse(&guid)?,
        title: row.try_get("title")?,
        artist_name: row.try_get::<Option<String>, _>("artist_name")?.unwrap_or_default(),
        release_year: row.try_get("release_year")?,
        created_at: row.try_get("created_at")?,
    })
}

#[derive(Clone)]
pub struct Catalog {
    pool: SqlitePool,
    policy: SearchPolicy,
}

impl Catalog {
    pub fn new(pool: SqlitePool, policy: SearchPolicy) -> Self {
        Self { pool, policy }
    }

    pub async fn add_album(&self, title: &str, artist_name: &str, release_year: Option<i32>) -> Result<Album> {
        if is_blank(title) {
            return Err(Error::validation(MSG_INVALID_ALBUM_NAME));
        }
        if is_blank(artist_name) {
            return Err(Error::validation(MSG_BLANK_ARTIST));
        }

        let album = Album {
            id: uuid_utils::generate(),
            title: title.trim().to_string(),
            artist_name: artist_name.trim().to_string(),
            release_year,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO albums (guid, title, artist_name, release_year, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(album.id.to_string())
        .bind(&album.title)
        .bind(&album.artist_name)
        .bind(album.release_year)
        .bind(album.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_ADD_FAILED))?;

        info!("Catalogued album '{}' by {}", album.title, album.artist_name);
        Ok(album)
    }

    pub async fn get_album(&self, id: Uuid) -> Result<Album> {
        let row = sqlx::query("SELECT * FROM albums WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::from(e).or_unavailable(MSG_LOOKUP_FAILED))?
            .ok_or_else(|| Error::not_found(MSG_ALBUM_NOT_FOUND))?;

        album_from_row(&row)
    }

    /// Albums whose title matches exactly, ignoring case
    pub async fn search_album(&self, title: &str) -> Result<Vec<Album>> {
        if is_blank(title) {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT * FROM albums WHERE title = ? COLLATE NOCASE ORDER BY title COLLATE NOCASE, created_at LIMIT ?",
        )
        .bind(title.trim())
        .bind(self.policy.result_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_LOOKUP_FAILED))?;

        rows.iter().map(album_from_row).collect()
    }

    /// Albums whose title contains `fragment`, ignoring case
    pub async fn search_album_partial(&self, fragment: &str) -> Result<Vec<Album>> {
        if is_blank(fragment) {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT * FROM albums WHERE title LIKE ? ESCAPE '\\' ORDER BY title COLLATE NOCASE, created_at LIMIT ?",
        )
        .bind(contains_pattern(fragment))
        .bind(self.policy.result_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_LOOKUP_FAILED))?;

        rows.iter().map(album_from_row).collect()
    }
}
