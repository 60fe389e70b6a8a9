//! Named album lists owned by users
//!
//! A list is created the first time an album is added to it. Lists are
//! private unless the owner makes them public; entries keep insertion order.

use crate::services::catalog::{Album, Catalog};
use crate::services::{is_unique_violation, users};
use crate::validation::is_blank;
use crate::{uuid_utils, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

pub const MSG_INVALID_ALBUM_NAME: &str = "Please enter a valid album name.";
pub const MSG_INVALID_LIST_NAME: &str = "Please enter a valid list name.";
pub const MSG_ALBUM_EXISTS: &str = "Album already exists.";
pub const MSG_ADD_FAILED: &str = "Unable to add album.";
pub const MSG_LIST_NOT_FOUND: &str = "List not found.";
pub const MSG_LIST_EXISTS: &str = "A list with that name already exists.";
pub const MSG_ALBUM_NOT_IN_LIST: &str = "Album not found in list.";
pub const MSG_LOAD_FAILED: &str = "Unable to retrieve data.";
pub const MSG_NOTHING_TO_UPDATE: &str = "Nothing to update.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumList {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub is_public: bool,
    pub album_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One album's membership in a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumListEntry {
    pub user_id: Uuid,
    pub list_name: String,
    pub album_title: String,
    pub position: i64,
    pub added_at: DateTime<Utc>,
}

/// A list with its albums, as shown to a viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListView {
    pub owner: String,
    pub list: AlbumList,
    pub albums: Vec<String>,
}

/// List edit; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUpdate {
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

const LIST_COLUMNS: &str = r#"
    l.guid, l.user_guid, l.name, l.is_public, l.created_at, l.updated_at,
    (SELECT COUNT(*) FROM album_list_entries e WHERE e.list_guid = l.guid) AS album_count
"#;

fn list_from_row(row: &SqliteRow) -> Result<AlbumList> {
    let guid: String = row.try_get("guid")?;
    let owner: String = row.try_get("user_guid")?;
    Ok(AlbumList {
        id: uuid_utils::parse(&guid)?,
        owner_id: uuid_utils::parse(&owner)?,
        name: row.try_get("name")?,
        is_public: row.try_get("is_public")?,
        album_count: row.try_get("album_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[derive(Clone)]
pub struct ListService {
    pool: SqlitePool,
    catalog: Catalog,
}

impl ListService {
    pub fn new(pool: SqlitePool, catalog: Catalog) -> Self {
        Self { pool, catalog }
    }

    /// Add an album title to a list, creating the list if needed
    pub async fn add_album_to_list(&self, user_id: Uuid, list_name: &str, album_title: &str) -> Result<AlbumListEntry> {
        if is_blank(album_title) {
            return Err(Error::validation(MSG_INVALID_ALBUM_NAME));
        }
        if is_blank(list_name) {
            return Err(Error::validation(MSG_INVALID_LIST_NAME));
        }

        self.insert_entry(user_id, list_name.trim(), album_title.trim())
            .await
            .map_err(|e| e.or_unavailable(MSG_ADD_FAILED))
    }

    async fn insert_entry(&self, user_id: Uuid, list_name: &str, album_title: &str) -> Result<AlbumListEntry> {
        self.ensure_user(user_id).await?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let list_id = match find_list_id(&mut *tx, user_id, list_name).await? {
            Some(id) => id,
            None => {
                let id = uuid_utils::generate();
                sqlx::query(
                    "INSERT INTO album_lists (guid, user_guid, name, is_public, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?)",
                )
                .bind(id.to_string())
                .bind(user_id.to_string())
                .bind(list_name)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                info!("Created list '{}' for {}", list_name, user_id);
                id
            }
        };

        let position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM album_list_entries WHERE list_guid = ?",
        )
        .bind(list_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO album_list_entries (list_guid, album_title, position, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(list_id.to_string())
        .bind(album_title)
        .bind(position)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                debug!("'{}' already in list '{}'", album_title, list_name);
                Error::conflict(MSG_ALBUM_EXISTS)
            } else {
                Error::Database(e)
            }
        })?;

        sqlx::query("UPDATE album_lists SET updated_at = ? WHERE guid = ?")
            .bind(now)
            .bind(list_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(AlbumListEntry {
            user_id,
            list_name: list_name.to_string(),
            album_title: album_title.to_string(),
            position,
            added_at: now,
        })
    }

    pub async fn remove_album_from_list(&self, user_id: Uuid, list_name: &str, album_title: &str) -> Result<()> {
        let list_id = self.require_list(user_id, list_name).await?;

        let result = sqlx::query("DELETE FROM album_list_entries WHERE list_guid = ? AND album_title = ?")
            .bind(list_id.to_string())
            .bind(album_title.trim())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(MSG_ALBUM_NOT_IN_LIST));
        }

        self.touch(list_id).await?;
        Ok(())
    }

    pub async fn rename_list(&self, user_id: Uuid, list_name: &str, new_name: &str) -> Result<AlbumList> {
        if is_blank(new_name) {
            return Err(Error::validation(MSG_INVALID_LIST_NAME));
        }
        let list_id = self.require_list(user_id, list_name).await?;

        sqlx::query("UPDATE album_lists SET name = ?, updated_at = ? WHERE guid = ?")
            .bind(new_name.trim())
            .bind(Utc::now())
            .bind(list_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::conflict(MSG_LIST_EXISTS)
                } else {
                    Error::Database(e)
                }
            })?;

        info!("Renamed list '{}' to '{}'", list_name.trim(), new_name.trim());
        self.load_list(list_id).await
    }

    /// Rename and change visibility together; either both apply or neither
    pub async fn update_list(&self, user_id: Uuid, list_name: &str, update: ListUpdate) -> Result<AlbumList> {
        if update.new_name.is_none() && update.is_public.is_none() {
            return Err(Error::validation(MSG_NOTHING_TO_UPDATE));
        }
        if update.new_name.as_deref().is_some_and(is_blank) || is_blank(list_name) {
            return Err(Error::validation(MSG_INVALID_LIST_NAME));
        }

        let mut tx = self.pool.begin().await?;
        let list_id = find_list_id(&mut *tx, user_id, list_name.trim())
            .await?
            .ok_or_else(|| Error::not_found(MSG_LIST_NOT_FOUND))?;

        sqlx::query(
            "UPDATE album_lists SET name = COALESCE(?, name), is_public = COALESCE(?, is_public), updated_at = ? WHERE guid = ?",
        )
        .bind(update.new_name.as_deref().map(str::trim))
        .bind(update.is_public)
        .bind(Utc::now())
        .bind(list_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::conflict(MSG_LIST_EXISTS)
            } else {
                Error::Database(e)
            }
        })?;
        tx.commit().await?;

        debug!("Updated list '{}' of {}: {:?}", list_name.trim(), user_id, update);
        self.load_list(list_id).await
    }

    pub async fn delete_list(&self, user_id: Uuid, list_name: &str) -> Result<()> {
        let list_id = self.require_list(user_id, list_name).await?;

        sqlx::query("DELETE FROM album_lists WHERE guid = ?")
            .bind(list_id.to_string())
            .execute(&self.pool)
            .await?;

        info!("Deleted list '{}' of {}", list_name.trim(), user_id);
        Ok(())
    }

    pub async fn set_list_visibility(&self, user_id: Uuid, list_name: &str, is_public: bool) -> Result<AlbumList> {
        let list_id = self.require_list(user_id, list_name).await?;

        sqlx::query("UPDATE album_lists SET is_public = ?, updated_at = ? WHERE guid = ?")
            .bind(is_public)
            .bind(Utc::now())
            .bind(list_id.to_string())
            .execute(&self.pool)
            .await?;

        self.load_list(list_id).await
    }

    /// The user's lists, oldest first
    pub async fn get_user_lists(&self, user_id: Uuid) -> Result<Vec<AlbumList>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM album_lists l WHERE l.user_guid = ? ORDER BY l.created_at, l.rowid",
            LIST_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_LOAD_FAILED))?;

        rows.iter().map(list_from_row).collect()
    }

    /// Another user's list; private lists are visible to their owner only
    pub async fn view_list(&self, viewer: Option<Uuid>, owner: &str, list_name: &str) -> Result<ListView> {
        let owner = users::load_user_by_username(&self.pool, owner)
            .await?
            .ok_or_else(|| Error::not_found("User not found."))?;

        let list_id = self.require_list(owner.id, list_name).await?;
        let list = self.load_list(list_id).await?;

        if !list.is_public && viewer != Some(owner.id) {
            debug!("Denied view of private list '{}' of '{}'", list.name, owner.username);
            return Err(Error::AccessDenied);
        }

        Ok(ListView {
            owner: owner.username,
            albums: self.titles(list_id).await?,
            list,
        })
    }

    pub async fn get_album_list_entry(&self, user_id: Uuid, list_name: &str, album_title: &str) -> Result<AlbumListEntry> {
        let row = sqlx::query(
            r#"
            SELECT l.name, e.album_title, e.position, e.added_at
            FROM album_list_entries e
            JOIN album_lists l ON l.guid = e.list_guid
            WHERE l.user_guid = ? AND l.name = ? AND e.album_title = ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(list_name.trim())
        .bind(album_title.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(MSG_ALBUM_NOT_IN_LIST))?;

        Ok(AlbumListEntry {
            user_id,
            list_name: row.try_get("name")?,
            album_title: row.try_get("album_title")?,
            position: row.try_get("position")?,
            added_at: row.try_get("added_at")?,
        })
    }

    /// Album titles in insertion order
    pub async fn get_albums_in_list(&self, user_id: Uuid, list_name: &str) -> Result<Vec<String>> {
        let list_id = self.require_list(user_id, list_name).await?;
        self.titles(list_id).await
    }

    pub async fn search_album(&self, title: &str) -> Result<Vec<Album>> {
        self.catalog.search_album(title).await
    }

    pub async fn search_album_partial(&self, fragment: &str) -> Result<Vec<Album>> {
        self.catalog.search_album_partial(fragment).await
    }

    async fn titles(&self, list_id: Uuid) -> Result<Vec<String>> {
        let titles = sqlx::query_scalar(
            "SELECT album_title FROM album_list_entries WHERE list_guid = ? ORDER BY position",
        )
        .bind(list_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_LOAD_FAILED))?;

        Ok(titles)
    }

    async fn require_list(&self, user_id: Uuid, list_name: &str) -> Result<Uuid> {
        if is_blank(list_name) {
            return Err(Error::validation(MSG_INVALID_LIST_NAME));
        }
        find_list_id(&self.pool, user_id, list_name.trim())
            .await?
            .ok_or_else(|| Error::not_found(MSG_LIST_NOT_FOUND))
    }

    async fn load_list(&self, list_id: Uuid) -> Result<AlbumList> {
        let row = sqlx::query(&format!("SELECT {} FROM album_lists l WHERE l.guid = ?", LIST_COLUMNS))
            .bind(list_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(MSG_LIST_NOT_FOUND))?;

        list_from_row(&row)
    }

    async fn touch(&self, list_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE album_lists SET updated_at = ? WHERE guid = ?")
            .bind(Utc::now())
            .bind(list_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<()> {
        if users::load_user(&self.pool, user_id).await?.is_none() {
            return Err(Error::not_found("User not found."));
        }
        Ok(())
    }
}

async fn find_list_id<'e, E>(executor: E, user_id: Uuid, list_name: &str) -> Result<Option<Uuid>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let guid: Option<String> = sqlx::query_scalar("SELECT guid FROM album_lists WHERE user_guid = ? AND name = ?")
        .bind(user_id.to_string())
        .bind(list_name)
        .fetch_optional(executor)
        .await?;

    guid.as_deref().map(uuid_utils::parse).transpose()
}
