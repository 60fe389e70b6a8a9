//! Album reviews and review likes

use crate::services::catalog::MSG_ALBUM_NOT_FOUND;
use crate::services::{is_unique_violation, users};
use crate::validation::{is_blank, sanitize_text};
use crate::{uuid_utils, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

pub const MSG_EMPTY_REVIEW: &str = "Review cannot be empty.";
pub const MSG_MISSING_RATING: &str = "Please provide a rating.";
pub const MSG_RATING_RANGE: &str = "Rating must be between 1 and 5.";
pub const MSG_ALREADY_REVIEWED: &str = "You’ve already reviewed this album.";
pub const MSG_REVIEW_NOT_FOUND: &str = "Review not found.";
pub const MSG_LOAD_FAILED: &str = "Unable to load reviews.";
pub const MSG_SAVE_FAILED: &str = "Unable to save review.";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Review submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub user_id: Uuid,
    pub album_id: Uuid,
    pub rating: Option<i64>,
    pub text: String,
}

/// Review edit; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub album_id: Uuid,
    pub rating: u8,
    /// HTML-escaped
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review as listed under an album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub username: String,
    pub like_count: i64,
}

const REVIEW_COLUMNS: &str =
    "r.guid, r.user_guid, r.album_guid, r.rating, r.review_text, r.created_at, r.updated_at";

fn review_from_row(row: &SqliteRow) -> Result<Review> {
    let guid: String = row.try_get("guid")?;
    let user_guid: String = row.try_get("user_guid")?;
    let album_guid: String = row.try_get("album_guid")?;
    let rating: i64 = row.try_get("rating")?;

    Ok(Review {
        id: uuid_utils::parse(&guid)?,
        user_id: uuid_utils::parse(&user_guid)?,
        album_id: uuid_utils::parse(&album_guid)?,
        rating: u8::try_from(rating)
            .map_err(|_| Error::Internal(format!("Stored rating out of range: {}", rating)))?,
        text: row.try_get("review_text")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Ratings arrive as plain integers so out-of-range input gets the rating message
fn check_rating(rating: Option<i64>) -> Result<u8> {
    let rating = rating.ok_or_else(|| Error::validation(MSG_MISSING_RATING))?;
    u8::try_from(rating)
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or_else(|| Error::validation(MSG_RATING_RANGE))
}

#[derive(Clone)]
pub struct ReviewService {
    pool: SqlitePool,
}

impl ReviewService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn submit_review(&self, new: NewReview) -> Result<Review> {
        if is_blank(&new.text) {
            return Err(Error::validation(MSG_EMPTY_REVIEW));
        }
        let rating = check_rating(new.rating)?;

        self.insert_review(new, rating)
            .await
            .map_err(|e| e.or_unavailable(MSG_SAVE_FAILED))
    }

    async fn insert_review(&self, new: NewReview, rating: u8) -> Result<Review> {
        let album_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM albums WHERE guid = ?)")
            .bind(new.album_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        if !album_exists {
            return Err(Error::not_found(MSG_ALBUM_NOT_FOUND));
        }
        if users::load_user(&self.pool, new.user_id).await?.is_none() {
            return Err(Error::not_found("User not found."));
        }

        let now = Utc::now();
        let review = Review {
            id: uuid_utils::generate(),
            user_id: new.user_id,
            album_id: new.album_id,
            rating,
            text: sanitize_text(&new.text),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO reviews (guid, user_guid, album_guid, rating, review_text, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(review.id.to_string())
        .bind(review.user_id.to_string())
        .bind(review.album_id.to_string())
        .bind(review.rating as i64)
        .bind(&review.text)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                debug!("Second review of album {} by {} rejected", review.album_id, review.user_id);
                Error::conflict(MSG_ALREADY_REVIEWED)
            } else {
                Error::Database(e)
            }
        })?;

        info!("Review {} saved for album {}", review.id, review.album_id);
        Ok(review)
    }

    /// Reviews of an album, newest first
    pub async fn get_reviews_for_album(&self, album_id: Uuid) -> Result<Vec<ReviewView>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}, u.username,
                   (SELECT COUNT(*) FROM review_likes l WHERE l.review_guid = r.guid) AS like_count
            FROM reviews r
            JOIN users u ON u.guid = r.user_guid
            WHERE r.album_guid = ?
            ORDER BY r.created_at DESC, r.rowid DESC
            "#,
            REVIEW_COLUMNS
        ))
        .bind(album_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_LOAD_FAILED))?;

        rows.iter()
            .map(|row| {
                Ok(ReviewView {
                    review: review_from_row(row)?,
                    username: row.try_get("username")?,
                    like_count: row.try_get("like_count")?,
                })
            })
            .collect()
    }

    /// The user's review of an album, if any
    pub async fn get_review(&self, user_id: Uuid, album_id: Uuid) -> Result<Option<Review>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM reviews r WHERE r.user_guid = ? AND r.album_guid = ?",
            REVIEW_COLUMNS
        ))
        .bind(user_id.to_string())
        .bind(album_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_LOAD_FAILED))?;

        row.as_ref().map(review_from_row).transpose()
    }

    pub async fn get_review_by_id(&self, review_id: Uuid) -> Result<Review> {
        let row = sqlx::query(&format!("SELECT {} FROM reviews r WHERE r.guid = ?", REVIEW_COLUMNS))
            .bind(review_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(MSG_REVIEW_NOT_FOUND))?;

        review_from_row(&row)
    }

    /// Reviews written by a user, newest first
    pub async fn get_user_reviews(&self, user_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reviews r WHERE r.user_guid = ? ORDER BY r.created_at DESC, r.rowid DESC",
            REVIEW_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::from(e).or_unavailable(MSG_LOAD_FAILED))?;

        rows.iter().map(review_from_row).collect()
    }

    pub async fn get_review_count(&self, album_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE album_guid = ?")
            .bind(album_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::from(e).or_unavailable(MSG_LOAD_FAILED))
    }

    /// Edit a review; only its author may do so
    pub async fn edit_review(&self, actor: Uuid, review_id: Uuid, update: ReviewUpdate) -> Result<Review> {
        let mut review = self.owned_review(actor, review_id).await?;

        if let Some(text) = update.text {
            if is_blank(&text) {
                return Err(Error::validation(MSG_EMPTY_REVIEW));
            }
            review.text = sanitize_text(&text);
        }
        if update.rating.is_some() {
            review.rating = check_rating(update.rating)?;
        }
        review.updated_at = Utc::now();

        sqlx::query("UPDATE reviews SET rating = ?, review_text = ?, updated_at = ? WHERE guid = ?")
            .bind(review.rating as i64)
            .bind(&review.text)
            .bind(review.updated_at)
            .bind(review.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::from(e).or_unavailable(MSG_SAVE_FAILED))?;

        info!("Review {} edited", review.id);
        Ok(review)
    }

    /// Delete a review; only its author may do so
    pub async fn delete_review(&self, actor: Uuid, review_id: Uuid) -> Result<()> {
        let review = self.owned_review(actor, review_id).await?;

        sqlx::query("DELETE FROM reviews WHERE guid = ?")
            .bind(review.id.to_string())
            .execute(&self.pool)
            .await?;

        info!("Review {} deleted", review.id);
        Ok(())
    }

    /// Like a review (idempotent)
    pub async fn like_review(&self, user_id: Uuid, review_id: Uuid) -> Result<i64> {
        self.get_review_by_id(review_id).await?;
        if users::load_user(&self.pool, user_id).await?.is_none() {
            return Err(Error::not_found("User not found."));
        }

        sqlx::query("INSERT OR IGNORE INTO review_likes (review_guid, user_guid, created_at) VALUES (?, ?, ?)")
            .bind(review_id.to_string())
            .bind(user_id.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        self.like_count(review_id).await
    }

    /// Remove a like (idempotent)
    pub async fn unlike_review(&self, user_id: Uuid, review_id: Uuid) -> Result<i64> {
        self.get_review_by_id(review_id).await?;

        sqlx::query("DELETE FROM review_likes WHERE review_guid = ? AND user_guid = ?")
            .bind(review_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        self.like_count(review_id).await
    }

    pub async fn like_count(&self, review_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM review_likes WHERE review_guid = ?")
            .bind(review_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn owned_review(&self, actor: Uuid, review_id: Uuid) -> Result<Review> {
        let review = self.get_review_by_id(review_id).await?;
        if review.user_id != actor {
            debug!("{} may not modify review {}", actor, review_id);
            return Err(Error::AccessDenied);
        }
        Ok(review)
    }
}
