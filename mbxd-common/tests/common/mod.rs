//! Shared setup for service integration tests

#![allow(dead_code)]

use mbxd_common::db::init::init_database;
use mbxd_common::services::{Album, Services, User};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const PASSWORD: &str = "StrongPass123";

/// Fresh database in a temp dir; keep the `TempDir` alive for the test
pub struct TestEnv {
    pub dir: TempDir,
    pub pool: SqlitePool,
    pub services: Services,
}

pub async fn setup() -> TestEnv {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("musicboxd.db"))
        .await
        .expect("database init");
    let services = Services::new(pool.clone()).await.expect("services");
    TestEnv { dir, pool, services }
}

pub async fn create_user(services: &Services, username: &str) -> User {
    let email = format!("{}@email.com", username.to_lowercase());
    services
        .auth
        .sign_up(username, &email, PASSWORD)
        .await
        .expect("sign up")
}

pub async fn create_album(services: &Services, title: &str, artist: &str) -> Album {
    services
        .catalog
        .add_album(title, artist, None)
        .await
        .expect("add album")
}
