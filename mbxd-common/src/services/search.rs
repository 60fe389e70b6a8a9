//! User search
//!
//! Results are [`PublicProfile`]s only; e-mail and credentials never leave
//! the users table through this service.

use crate::db::settings::SearchPolicy;
use crate::services::users::{self, PublicProfile, User};
use crate::validation::{clean_text, contains_pattern, same_text};
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;

pub const MSG_EMPTY_QUERY: &str = "Please enter a username.";
pub const MSG_BLANK_QUERY: &str = "Please enter valid text.";
pub const MSG_LOOKUP_FAILED: &str = "Unable to retrieve data.";

fn check_query(query: &str) -> Result<&str> {
    if query.is_empty() {
        return Err(Error::validation(MSG_EMPTY_QUERY));
    }
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(MSG_BLANK_QUERY));
    }
    Ok(trimmed)
}

fn matches_filters(user: &User, genre: Option<&str>, location: Option<&str>) -> bool {
    let genre_ok = genre.map_or(true, |g| user.genres.iter().any(|have| same_text(have, g)));
    let location_ok = location.map_or(true, |l| same_text(&user.location, l));
    genre_ok && location_ok
}

#[derive(Clone)]
pub struct UserSearchService {
    pool: SqlitePool,
    policy: SearchPolicy,
}

impl UserSearchService {
    pub fn new(pool: SqlitePool, policy: SearchPolicy) -> Self {
        Self { pool, policy }
    }

    /// Exact username lookup, ignoring case
    pub async fn search_by_username(&self, query: &str) -> Result<Option<PublicProfile>> {
        let username = check_query(query)?;

        let user = users::load_user_by_username(&self.pool, username)
            .await
            .map_err(|e| e.or_unavailable(MSG_LOOKUP_FAILED))?;

        Ok(user.map(PublicProfile::from))
    }

    /// Usernames containing `fragment`, ignoring case
    pub async fn search_by_partial_username(&self, fragment: &str) -> Result<Vec<PublicProfile>> {
        let fragment = check_query(fragment)?;

        let found = users::load_users_like(&self.pool, &contains_pattern(fragment), self.policy.result_limit)
            .await
            .map_err(|e| e.or_unavailable(MSG_LOOKUP_FAILED))?;

        debug!("Partial search '{}' matched {} users", fragment, found.len());
        Ok(found.into_iter().map(PublicProfile::from).collect())
    }

    /// Users having the genre and living at the location; blank filters are ignored
    pub async fn search_with_filters(&self, genre: Option<&str>, location: Option<&str>) -> Result<Vec<PublicProfile>> {
        // Same cleaning as update_profile applies to the stored values
        let genre = genre.map(clean_text).filter(|g| !g.is_empty());
        let location = location.map(clean_text).filter(|l| !l.is_empty());

        let all = users::load_all_users(&self.pool)
            .await
            .map_err(|e| e.or_unavailable(MSG_LOOKUP_FAILED))?;

        Ok(all
            .into_iter()
            .filter(|u| matches_filters(u, genre.as_deref(), location.as_deref()))
            .take(self.policy.result_limit as usize)
            .map(PublicProfile::from)
            .collect())
    }
}
