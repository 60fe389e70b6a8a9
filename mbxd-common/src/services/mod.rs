//! Application services
//!
//! Each service holds a clone of the shared `SqlitePool`; they are cheap to
//! clone and safe to share between tasks.

pub mod auth;
pub mod catalog;
pub mod lists;
pub mod password;
pub mod profile;
pub mod reviews;
pub mod search;
pub mod top_chart;
pub mod users;

pub use auth::{AuthService, PasswordReset, Session, SessionStatus};
pub use catalog::{Album, Catalog};
pub use lists::{AlbumList, AlbumListEntry, ListService, ListUpdate, ListView};
pub use profile::{
    Profile, ProfileExport, ProfileService, ProfileUpdate, TopAlbumEntry, TopSongEntry,
};
pub use reviews::{NewReview, Review, ReviewService, ReviewUpdate, ReviewView};
pub use search::UserSearchService;
pub use top_chart::{ChartEntry, ChartKind, TopChartTracker};
pub use users::{PublicProfile, User};

use crate::db::settings::{AuthPolicy, SearchPolicy};
use crate::Result;
use sqlx::SqlitePool;

/// True when a query failed on a UNIQUE or PRIMARY KEY constraint
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}

/// Every service wired to one pool
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub profile: ProfileService,
    pub lists: ListService,
    pub catalog: Catalog,
    pub reviews: ReviewService,
    pub search: UserSearchService,
    pool: SqlitePool,
}

impl Services {
    /// Build services using the policy stored in the settings table
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let auth_policy = AuthPolicy::load(&pool).await?;
        let search_policy = SearchPolicy::load(&pool).await?;
        Ok(Self::with_policies(pool, auth_policy, search_policy))
    }

    pub fn with_policies(pool: SqlitePool, auth_policy: AuthPolicy, search_policy: SearchPolicy) -> Self {
        let catalog = Catalog::new(pool.clone(), search_policy.clone());
        Self {
            auth: AuthService::new(pool.clone(), auth_policy),
            profile: ProfileService::new(pool.clone()),
            lists: ListService::new(pool.clone(), catalog.clone()),
            reviews: ReviewService::new(pool.clone()),
            search: UserSearchService::new(pool.clone(), search_policy),
            catalog,
            pool,
        }
    }

    /// Schema version of the connected database; fails when it is unreachable
    pub async fn ping(&self) -> Result<i32> {
        crate::db::migrations::get_schema_version(&self.pool).await
    }
}
