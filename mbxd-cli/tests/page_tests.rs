//! Profile page lookup

use mbxd_cli::ProfilePageLocator;
use mbxd_common::config::DEFAULT_PROFILE_PAGE;
use tempfile::TempDir;

#[test]
fn test_page_found_under_resources() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("resources")).unwrap();
    let page = dir.path().join("resources").join("custom.html");
    std::fs::write(&page, "<html></html>").unwrap();

    let found = ProfilePageLocator::new("custom.html", None)
        .with_base_dir(dir.path())
        .locate()
        .unwrap();
    assert_eq!(found, page.canonicalize().unwrap());
}

#[test]
fn test_working_dir_wins_over_asset_dir() {
    let dir = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();
    std::fs::write(dir.path().join("custom.html"), "local").unwrap();
    std::fs::write(assets.path().join("custom.html"), "asset").unwrap();

    let found = ProfilePageLocator::new("custom.html", Some(assets.path().to_path_buf()))
        .with_base_dir(dir.path())
        .locate()
        .unwrap();
    assert_eq!(std::fs::read_to_string(found).unwrap(), "local");
}

#[test]
fn test_asset_dir_is_searched() {
    let dir = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();
    std::fs::write(assets.path().join("custom.html"), "asset").unwrap();

    let found = ProfilePageLocator::new("custom.html", Some(assets.path().to_path_buf()))
        .with_base_dir(dir.path())
        .locate()
        .unwrap();
    assert_eq!(std::fs::read_to_string(found).unwrap(), "asset");
}

#[test]
fn test_embedded_page_written_to_temp_file() {
    let dir = TempDir::new().unwrap();

    let found = ProfilePageLocator::new(DEFAULT_PROFILE_PAGE, None)
        .with_base_dir(dir.path())
        .locate()
        .unwrap();

    assert!(!found.starts_with(dir.path()));
    let contents = std::fs::read_to_string(&found).unwrap();
    assert!(contents.contains("Musicboxd"));
    std::fs::remove_file(found).unwrap();
}

#[test]
fn test_missing_page_error() {
    let dir = TempDir::new().unwrap();

    let err = ProfilePageLocator::new("nowhere.html", None)
        .with_base_dir(dir.path())
        .locate()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "HTML file not found in filesystem or embedded assets: nowhere.html"
    );
}
