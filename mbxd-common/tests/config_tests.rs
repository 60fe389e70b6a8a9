//! Configuration loading and root folder resolution
//!
//! Tests that touch MUSICBOXD_ROOT_FOLDER are `#[serial]` so they do not race
//! on the process environment.

use mbxd_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig, DATABASE_FILE,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();
    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.to_string_lossy().contains("musicboxd"));
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.log_file.is_none());
}

#[test]
#[serial]
fn test_resolver_falls_back_to_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = RootFolderResolver::new("test").resolve();
    assert_eq!(root, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_priority_order() {
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/mbxd-from-toml")),
        ..TomlConfig::default()
    };

    env::remove_var(ROOT_FOLDER_ENV);
    let root = RootFolderResolver::new("test").with_toml_config(&toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/mbxd-from-toml"));

    env::set_var(ROOT_FOLDER_ENV, "/tmp/mbxd-from-env");
    let root = RootFolderResolver::new("test").with_toml_config(&toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/mbxd-from-env"));

    let root = RootFolderResolver::new("test")
        .with_cli_arg(Some(PathBuf::from("/tmp/mbxd-from-cli")))
        .with_toml_config(&toml)
        .resolve();
    assert_eq!(root, PathBuf::from("/tmp/mbxd-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml")));
    assert!(config.root_folder.is_none());
    assert_eq!(config.web.port, 5780);
}

#[test]
fn test_invalid_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();

    assert!(TomlConfig::load(&path).is_err());
    let config = TomlConfig::load_or_default(Some(&path));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        root_folder = "/srv/musicboxd"

        [logging]
        level = "debug"

        [profile]
        open_browser = false
        asset_dir = "/usr/share/musicboxd"
        "#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/musicboxd")));
    assert_eq!(config.logging.level, "debug");
    assert!(!config.profile.open_browser);
    assert_eq!(config.profile.asset_dir, Some(PathBuf::from("/usr/share/musicboxd")));
}

#[test]
fn test_root_folder_initializer() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();
    assert!(root.is_dir());
    assert_eq!(init.database_path(), root.join(DATABASE_FILE));

    let explicit = dir.path().join("elsewhere.db");
    assert_eq!(init.database_path_or(Some(&explicit)), explicit);
    assert_eq!(init.database_path_or(None), root.join(DATABASE_FILE));
}
