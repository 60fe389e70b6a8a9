//! Bounded favourites charts (top songs, top albums)
//!
//! A chart is an ordered list of at most `capacity` entries per user.
//! Every mutation rewrites the user's chart inside one transaction, so
//! positions stay dense (`0..len`) and the bound holds under concurrent
//! requests.

use crate::services::users;
use crate::validation::is_blank;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Placeholder shown for unused chart slots
pub const EMPTY_SLOT: &str = "Empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Songs,
    Albums,
}

impl ChartKind {
    pub fn capacity(self) -> usize {
        match self {
            ChartKind::Songs => 5,
            ChartKind::Albums => 4,
        }
    }

    /// Value of the `chart` column
    fn column_value(self) -> &'static str {
        match self {
            ChartKind::Songs => "song",
            ChartKind::Albums => "album",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            ChartKind::Songs => "song",
            ChartKind::Albums => "album",
        }
    }

    fn blank_title_message(self) -> String {
        match self {
            ChartKind::Songs => "Song name cannot be blank.".to_string(),
            ChartKind::Albums => "Album name cannot be blank.".to_string(),
        }
    }

    fn full_message(self) -> String {
        format!("Maximum of {} top {}s allowed.", self.capacity(), self.noun())
    }

    fn duplicate_message(self) -> String {
        format!("Duplicate {} entries are not allowed.", self.noun())
    }
}

/// One chart slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub title: String,
    pub artist_name: String,
}

impl ChartEntry {
    pub fn new(title: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist_name: artist_name.into(),
        }
    }

    fn same_as(&self, other: &ChartEntry) -> bool {
        self.title.to_lowercase() == other.title.to_lowercase()
            && self.artist_name.to_lowercase() == other.artist_name.to_lowercase()
    }
}

/// Tracks one chart kind for all users
#[derive(Clone)]
pub struct TopChartTracker {
    pool: SqlitePool,
    kind: ChartKind,
}

impl TopChartTracker {
    pub fn new(pool: SqlitePool, kind: ChartKind) -> Self {
        Self { pool, kind }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Entries in chart order
    pub async fn entries(&self, user_id: Uuid) -> Result<Vec<ChartEntry>> {
        self.ensure_user(user_id).await?;
        let mut tx = self.pool.begin().await?;
        let entries = self.load(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(entries)
    }

    /// Titles padded with [`EMPTY_SLOT`] up to the chart capacity
    pub async fn layout(&self, user_id: Uuid) -> Result<Vec<String>> {
        let entries = self.entries(user_id).await?;
        Ok(layout_of(&entries, self.kind.capacity()))
    }

    /// Append an entry; returns its position
    pub async fn add(&self, user_id: Uuid, entry: ChartEntry) -> Result<usize> {
        let entry = self.validate(entry)?;
        self.ensure_user(user_id).await?;

        let mut tx = self.pool.begin().await?;
        let mut entries = self.load(&mut tx, user_id).await?;

        if entries.iter().any(|e| e.same_as(&entry)) {
            debug!("Duplicate top {} rejected for {}", self.kind.noun(), user_id);
            return Err(Error::conflict(self.kind.duplicate_message()));
        }
        if entries.len() >= self.kind.capacity() {
            return Err(Error::LimitExceeded(self.kind.full_message()));
        }

        entries.push(entry);
        let position = entries.len() - 1;
        self.store(&mut tx, user_id, &entries).await?;
        tx.commit().await?;

        info!("Added top {} #{} for {}", self.kind.noun(), position + 1, user_id);
        Ok(position)
    }

    /// Replace the entry at `index`
    pub async fn edit(&self, user_id: Uuid, index: usize, entry: ChartEntry) -> Result<()> {
        let entry = self.validate(entry)?;
        self.ensure_user(user_id).await?;

        let mut tx = self.pool.begin().await?;
        let mut entries = self.load(&mut tx, user_id).await?;
        check_index(index, entries.len())?;

        let duplicate = entries
            .iter()
            .enumerate()
            .any(|(i, e)| i != index && e.same_as(&entry));
        if duplicate {
            return Err(Error::conflict(self.kind.duplicate_message()));
        }

        entries[index] = entry;
        self.store(&mut tx, user_id, &entries).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove the entry at `index`; later entries move up
    pub async fn delete(&self, user_id: Uuid, index: usize) -> Result<ChartEntry> {
        self.ensure_user(user_id).await?;

        let mut tx = self.pool.begin().await?;
        let mut entries = self.load(&mut tx, user_id).await?;
        check_index(index, entries.len())?;

        let removed = entries.remove(index);
        self.store(&mut tx, user_id, &entries).await?;
        tx.commit().await?;
        Ok(removed)
    }

    /// Move the entry at `from` to position `to`
    pub async fn reorder(&self, user_id: Uuid, from: usize, to: usize) -> Result<()> {
        self.ensure_user(user_id).await?;

        let mut tx = self.pool.begin().await?;
        let mut entries = self.load(&mut tx, user_id).await?;
        check_index(from, entries.len())?;
        check_index(to, entries.len())?;

        let entry = entries.remove(from);
        entries.insert(to, entry);
        self.store(&mut tx, user_id, &entries).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Validate a whole chart for import
    ///
    /// Entries past the capacity are dropped; duplicates are rejected.
    pub(crate) fn prepare(&self, entries: Vec<ChartEntry>) -> Result<Vec<ChartEntry>> {
        let capacity = self.kind.capacity();
        if entries.len() > capacity {
            warn!(
                "Imported top {} chart has {} entries, keeping the first {}",
                self.kind.noun(),
                entries.len(),
                capacity
            );
        }

        let mut prepared: Vec<ChartEntry> = Vec::with_capacity(capacity);
        for entry in entries.into_iter().take(capacity) {
            let entry = self.validate(entry)?;
            if prepared.iter().any(|e| e.same_as(&entry)) {
                return Err(Error::conflict(self.kind.duplicate_message()));
            }
            prepared.push(entry);
        }
        Ok(prepared)
    }

    fn validate(&self, entry: ChartEntry) -> Result<ChartEntry> {
        if is_blank(&entry.title) {
            return Err(Error::validation(self.kind.blank_title_message()));
        }
        if is_blank(&entry.artist_name) {
            return Err(Error::validation("Artist name cannot be blank."));
        }
        Ok(ChartEntry::new(entry.title.trim(), entry.artist_name.trim()))
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<()> {
        if users::load_user(&self.pool, user_id).await?.is_none() {
            return Err(Error::not_found("User not found."));
        }
        Ok(())
    }

    async fn load(&self, tx: &mut Transaction<'_, Sqlite>, user_id: Uuid) -> Result<Vec<ChartEntry>> {
        let rows = sqlx::query(
            "SELECT title, artist_name FROM top_entries WHERE user_guid = ? AND chart = ? ORDER BY position",
        )
        .bind(user_id.to_string())
        .bind(self.kind.column_value())
        .fetch_all(&mut **tx)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ChartEntry {
                    title: row.try_get("title")?,
                    artist_name: row.try_get("artist_name")?,
                })
            })
            .collect()
    }

    /// Rewrite the user's chart inside `tx`
    pub(crate) async fn store(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user_id: Uuid,
        entries: &[ChartEntry],
    ) -> Result<()> {
        sqlx::query("DELETE FROM top_entries WHERE user_guid = ? AND chart = ?")
            .bind(user_id.to_string())
            .bind(self.kind.column_value())
            .execute(&mut **tx)
            .await?;

        for (position, entry) in entries.iter().enumerate() {
            sqlx::query(
                "INSERT INTO top_entries (user_guid, chart, position, title, artist_name) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(user_id.to_string())
            .bind(self.kind.column_value())
            .bind(position as i64)
            .bind(&entry.title)
            .bind(&entry.artist_name)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::not_found(format!("No entry at position {}.", index)));
    }
    Ok(())
}

/// Chart titles followed by empty slots
pub fn layout_of(entries: &[ChartEntry], capacity: usize) -> Vec<String> {
    let mut layout: Vec<String> = entries
        .iter()
        .take(capacity)
        .map(|e| e.title.clone())
        .collect();
    layout.resize(capacity, EMPTY_SLOT.to_string());
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_follow_capacity() {
        assert_eq!(ChartKind::Songs.full_message(), "Maximum of 5 top songs allowed.");
        assert_eq!(ChartKind::Albums.full_message(), "Maximum of 4 top albums allowed.");
        assert_eq!(
            ChartKind::Songs.duplicate_message(),
            "Duplicate song entries are not allowed."
        );
    }

    #[test]
    fn test_layout_pads_with_empty_slots() {
        let layout = layout_of(&[ChartEntry::new("Only One", "Solo Artist")], 4);
        assert_eq!(layout, vec!["Only One", EMPTY_SLOT, EMPTY_SLOT, EMPTY_SLOT]);
    }

    #[test]
    fn test_duplicate_comparison_ignores_case() {
        let a = ChartEntry::new("Repeat Song", "Repeat Artist");
        let b = ChartEntry::new("repeat song", "REPEAT ARTIST");
        assert!(a.same_as(&b));
        assert!(!a.same_as(&ChartEntry::new("Repeat Song", "Other Artist")));
    }

    #[tokio::test]
    async fn test_prepare_trims_and_caps_entries() {
        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        let tracker = TopChartTracker::new(pool, ChartKind::Albums);

        let entries: Vec<ChartEntry> = (1..=6)
            .map(|i| ChartEntry::new(format!(" Album {} ", i), "Artist"))
            .collect();
        let prepared = tracker.prepare(entries).unwrap();
        assert_eq!(prepared.len(), 4);
        assert_eq!(prepared[0].title, "Album 1");

        let dupes = vec![ChartEntry::new("Same", "Artist"), ChartEntry::new("SAME", "artist")];
        let err = tracker.prepare(dupes).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate album entries are not allowed.");

        let err = tracker.prepare(vec![ChartEntry::new("", "Artist")]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
