//! Database initialization and runtime settings

use mbxd_common::db::init::init_database;
use mbxd_common::db::migrations::get_schema_version;
use mbxd_common::db::settings::{
    get_setting, set_setting, AuthPolicy, SearchPolicy, LOCKOUT_SECONDS, MAX_FAILED_LOGINS,
    MIN_PASSWORD_LENGTH, PASSWORD_RESET_TTL_SECONDS, SEARCH_RESULT_LIMIT, SESSION_TTL_SECONDS,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_created_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("musicboxd.db");
    assert!(!db_path.exists());

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_reopening_existing_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("musicboxd.db");

    let first = init_database(&db_path).await.unwrap();
    set_setting(&first, SESSION_TTL_SECONDS, "60").await.unwrap();
    first.close().await;

    let second = init_database(&db_path).await.unwrap();
    // Existing values survive; defaults only fill gaps
    assert_eq!(
        get_setting(&second, SESSION_TTL_SECONDS).await.unwrap().as_deref(),
        Some("60")
    );
    assert_eq!(get_schema_version(&second).await.unwrap(), 1);
}

#[tokio::test]
async fn test_all_tables_exist() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("musicboxd.db")).await.unwrap();

    for table in [
        "settings",
        "users",
        "sessions",
        "password_resets",
        "albums",
        "top_entries",
        "album_lists",
        "album_list_entries",
        "reviews",
        "review_likes",
    ] {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1, "missing table {}", table);
    }
}

#[tokio::test]
async fn test_default_policies() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("musicboxd.db")).await.unwrap();

    let auth = AuthPolicy::load(&pool).await.unwrap();
    assert_eq!(auth.session_ttl, chrono::Duration::seconds(1800));
    assert_eq!(auth.max_failed_logins, 5);
    assert_eq!(auth.lockout, chrono::Duration::seconds(900));
    assert_eq!(auth.min_password_length, 8);

    let search = SearchPolicy::load(&pool).await.unwrap();
    assert_eq!(search.result_limit, 50);
}

#[tokio::test]
async fn test_invalid_setting_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("musicboxd.db")).await.unwrap();

    set_setting(&pool, MAX_FAILED_LOGINS, "many").await.unwrap();
    set_setting(&pool, SEARCH_RESULT_LIMIT, "10").await.unwrap();

    let auth = AuthPolicy::load(&pool).await.unwrap();
    assert_eq!(auth.max_failed_logins, 5);

    let search = SearchPolicy::load(&pool).await.unwrap();
    assert_eq!(search.result_limit, 10);
}

#[tokio::test]
async fn test_out_of_range_settings_fall_back_to_default() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("musicboxd.db")).await.unwrap();

    set_setting(&pool, SESSION_TTL_SECONDS, "99999999999999").await.unwrap();
    set_setting(&pool, LOCKOUT_SECONDS, "-5").await.unwrap();
    set_setting(&pool, PASSWORD_RESET_TTL_SECONDS, "0").await.unwrap();
    set_setting(&pool, MAX_FAILED_LOGINS, "0").await.unwrap();
    set_setting(&pool, MIN_PASSWORD_LENGTH, "-1").await.unwrap();
    set_setting(&pool, SEARCH_RESULT_LIMIT, "-3").await.unwrap();

    let auth = AuthPolicy::load(&pool).await.unwrap();
    assert_eq!(auth.session_ttl, chrono::Duration::seconds(1800));
    assert_eq!(auth.lockout, chrono::Duration::seconds(900));
    assert_eq!(auth.password_reset_ttl, chrono::Duration::seconds(3600));
    assert_eq!(auth.max_failed_logins, 5);
    assert_eq!(auth.min_password_length, 8);

    let search = SearchPolicy::load(&pool).await.unwrap();
    assert_eq!(search.result_limit, 50);

    // Stored values are left alone
    assert_eq!(
        get_setting(&pool, LOCKOUT_SECONDS).await.unwrap().as_deref(),
        Some("-5")
    );
}
