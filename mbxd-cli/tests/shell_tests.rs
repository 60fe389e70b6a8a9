//! Scripted menu sessions against a real database
//!
//! Browser launch is disabled throughout; the profile page comes from the
//! test's temp dir.

use chrono::Duration;
use mbxd_cli::{
    AuthProvider, ConsoleProfileProvider, PageLauncher, ProfilePageLocator, ProfileProvider,
    ServiceAuthProvider, Shell, ShellExit,
};
use mbxd_common::config::DEFAULT_PROFILE_PAGE;
use mbxd_common::db::init::init_database;
use mbxd_common::db::settings::{AuthPolicy, SearchPolicy};
use mbxd_common::services::{ProfileUpdate, TopSongEntry};
use mbxd_common::Services;
use tempfile::TempDir;

const PASSWORD: &str = "StrongPass123";

async fn setup() -> (TempDir, Services) {
    setup_with_policy(AuthPolicy::default()).await
}

async fn setup_with_policy(policy: AuthPolicy) -> (TempDir, Services) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("musicboxd.db")).await.unwrap();
    let services = Services::with_policies(pool, policy, SearchPolicy::default());
    std::fs::write(dir.path().join(DEFAULT_PROFILE_PAGE), "<html>profile</html>").unwrap();
    (dir, services)
}

/// Run the shell over `script`; returns how it ended and everything printed
async fn run_script(dir: &TempDir, services: &Services, script: &str) -> (ShellExit, String) {
    let locator = ProfilePageLocator::new(DEFAULT_PROFILE_PAGE, None).with_base_dir(dir.path());
    let mut shell = Shell::new(
        ServiceAuthProvider::new(services.auth.clone()),
        ConsoleProfileProvider::new(services.profile.clone(), locator, PageLauncher::new(false)),
        script.as_bytes(),
        Vec::new(),
    );
    let exit = shell.run().await.unwrap();
    let output = String::from_utf8(shell.into_output()).unwrap();
    (exit, output)
}

#[tokio::test]
async fn test_exit_from_welcome_menu() {
    let (dir, services) = setup().await;

    let (exit, output) = run_script(&dir, &services, "3\n").await;
    assert_eq!(exit, ShellExit::Exit);
    assert!(output.contains("Welcome to Musicboxd"));
    assert!(output.contains("1) Log in"));
    assert!(output.contains("Exiting."));
}

#[tokio::test]
async fn test_invalid_option_then_end_of_input() {
    let (dir, services) = setup().await;

    let (exit, output) = run_script(&dir, &services, "9\n").await;
    assert_eq!(exit, ShellExit::EndOfInput);
    assert!(output.contains("Invalid option."));
}

#[tokio::test]
async fn test_create_account_shows_profile() {
    let (dir, services) = setup().await;

    let script = "2\nnewUser\nnew@email.com\nStrongPass123\nStrongPass123\n3\n";
    let (exit, output) = run_script(&dir, &services, script).await;

    assert_eq!(exit, ShellExit::Quit);
    assert!(output.contains("Account created and logged in."));
    assert!(output.contains("Logged in as: newUser"));
    assert!(output.contains("Top songs:"));
    assert!(output.contains("  5. Empty"));
    assert!(output.contains("Open this file in a browser: "));
    assert!(output.contains("Quit."));

    // Quitting ends the session
    assert!(!services.auth.check_session("newUser").await.unwrap().active);
}

#[tokio::test]
async fn test_create_account_errors_are_printed() {
    let (dir, services) = setup().await;

    let script = "2\nnewUser\nnew@email.com\nStrongPass123\nWrongPass123\n3\n";
    let (exit, output) = run_script(&dir, &services, script).await;
    assert_eq!(exit, ShellExit::Exit);
    assert!(output.contains("Passwords do not match."));

    services.auth.sign_up("existingUser", "existing@email.com", PASSWORD).await.unwrap();
    let script = "2\nexistingUser\nother@email.com\nStrongPass123\nStrongPass123\n3\n";
    let (_, output) = run_script(&dir, &services, script).await;
    assert!(output.contains("Username already exists."));
}

#[tokio::test]
async fn test_login_failures_stay_on_welcome_menu() {
    let (dir, services) = setup().await;
    services.auth.sign_up("validUser", "valid@email.com", PASSWORD).await.unwrap();

    let script = "1\nvalidUser\nwrongPass1\n1\nghostUser\nanyPass\n1\n\n\n3\n";
    let (exit, output) = run_script(&dir, &services, script).await;

    assert_eq!(exit, ShellExit::Exit);
    assert!(output.contains("Incorrect password."));
    assert!(output.contains("User not found."));
    assert!(output.contains("Please enter username and password."));
    assert!(!output.contains("Logged in successfully."));
}

#[tokio::test]
async fn test_logout_returns_to_welcome_menu() {
    let (dir, services) = setup().await;
    services.auth.sign_up("validUser", "valid@email.com", PASSWORD).await.unwrap();

    let script = "1\nvalid@email.com\nStrongPass123\n7\n2\n3\n";
    let (exit, output) = run_script(&dir, &services, script).await;

    assert_eq!(exit, ShellExit::Exit);
    assert!(output.contains("Logged in successfully."));
    assert!(output.contains("Invalid option."));
    assert!(output.contains("Logged out."));
    assert_eq!(output.matches("Welcome to Musicboxd").count(), 2);
}

#[tokio::test]
async fn test_profile_lists_top_entries() {
    let (dir, services) = setup().await;
    let user = services.auth.sign_up("songFan", "fan@email.com", PASSWORD).await.unwrap();
    services
        .profile
        .add_top_song(user.id, TopSongEntry::new("Bohemian Rhapsody", "Queen"))
        .await
        .unwrap();

    let script = "1\nsongFan\nStrongPass123\n1\n3\n";
    let (_, output) = run_script(&dir, &services, script).await;

    assert_eq!(output.matches("  1. Bohemian Rhapsody").count(), 2);
    assert!(output.contains("  2. Empty"));
    assert!(output.contains("Top albums:"));
}

#[tokio::test]
async fn test_refresh_after_session_expiry() {
    let policy = AuthPolicy {
        session_ttl: Duration::seconds(0),
        ..AuthPolicy::default()
    };
    let (dir, services) = setup_with_policy(policy).await;
    services.auth.sign_up("idleUser", "idle@email.com", PASSWORD).await.unwrap();

    let script = "1\nidleUser\nStrongPass123\n1\n3\n";
    let (exit, output) = run_script(&dir, &services, script).await;

    assert_eq!(exit, ShellExit::Exit);
    assert!(output.contains("Your session has expired. Please log in again."));
}

#[tokio::test]
async fn test_auth_provider_tracks_session() {
    let (_dir, services) = setup().await;
    services.auth.sign_up("validUser", "valid@email.com", PASSWORD).await.unwrap();
    let provider = ServiceAuthProvider::new(services.auth.clone());

    assert!(provider.current_user().await.unwrap().is_none());

    let user = provider.login("validUser", PASSWORD).await.unwrap();
    assert_eq!(user.username, "validUser");
    let current = provider.current_user().await.unwrap().unwrap();
    assert_eq!(current.id, user.id);

    provider.logout().await.unwrap();
    assert!(provider.current_user().await.unwrap().is_none());
    // Logging out twice is harmless
    provider.logout().await.unwrap();
}

fn page_line(output: &str) -> String {
    output
        .lines()
        .find(|l| l.starts_with("Open this file in a browser: "))
        .map(str::to_string)
        .unwrap()
}

#[tokio::test]
async fn test_refresh_reuses_embedded_page() {
    let (_dir, services) = setup().await;
    let empty = TempDir::new().unwrap();
    let user = services.auth.sign_up("pageUser", "page@email.com", PASSWORD).await.unwrap();
    let provider = ConsoleProfileProvider::new(
        services.profile.clone(),
        ProfilePageLocator::new(DEFAULT_PROFILE_PAGE, None).with_base_dir(empty.path()),
        PageLauncher::new(false),
    );

    let first = page_line(&provider.show_profile(&user).await.unwrap());
    let second = page_line(&provider.show_profile(&user).await.unwrap());
    assert_eq!(first, second);

    // A deleted page is written out again
    let path = first.trim_start_matches("Open this file in a browser: ");
    std::fs::remove_file(path).unwrap();
    let third = page_line(&provider.show_profile(&user).await.unwrap());
    assert_ne!(first, third);
    std::fs::remove_file(third.trim_start_matches("Open this file in a browser: ")).unwrap();
}

#[tokio::test]
async fn test_profile_block_shows_plain_details() {
    let (dir, services) = setup().await;
    let user = services.auth.sign_up("bioUser", "bio@email.com", PASSWORD).await.unwrap();
    services
        .profile
        .update_profile(
            user.id,
            ProfileUpdate {
                public_bio: Some("Rock & <roll>".to_string()),
                location: Some("St. John's".to_string()),
                genres: Some(vec!["R&B".to_string()]),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();
    let user = services.auth.find_user(user.id).await.unwrap().unwrap();

    let provider = ConsoleProfileProvider::new(
        services.profile.clone(),
        ProfilePageLocator::new(DEFAULT_PROFILE_PAGE, None).with_base_dir(dir.path()),
        PageLauncher::new(false),
    );
    let output = provider.show_profile(&user).await.unwrap();
    assert!(output.contains("Bio: Rock & <roll>"));
    assert!(output.contains("Location: St. John's"));
    assert!(output.contains("Genres: R&B"));
}
