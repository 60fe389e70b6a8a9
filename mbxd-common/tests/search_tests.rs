//! User search

mod common;

use common::{create_user, setup};
use mbxd_common::services::ProfileUpdate;
use mbxd_common::Error;
use uuid::Uuid;

async fn set_details(env: &common::TestEnv, id: Uuid, genres: &[&str], location: &str) {
    env.services
        .profile
        .update_profile(
            id,
            ProfileUpdate {
                public_bio: Some("Crate digger".to_string()),
                location: Some(location.to_string()),
                genres: Some(genres.iter().map(|g| g.to_string()).collect()),
                theme_color: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_search_by_username() {
    let env = setup().await;
    let user = create_user(&env.services, "musicFan123").await;
    set_details(&env, user.id, &["rock"], "Chicago").await;

    let profile = env
        .services
        .search
        .search_by_username("musicFan123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.username, "musicFan123");
    assert_eq!(profile.public_bio, "Crate digger");
    assert_eq!(profile.genres, vec!["rock"]);

    // Public profile carries no e-mail
    let json = serde_json::to_value(&profile).unwrap();
    assert!(json.get("email").is_none());
}

#[tokio::test]
async fn test_search_ignores_case() {
    let env = setup().await;
    create_user(&env.services, "musicFan123").await;
    let search = &env.services.search;

    let lower = search.search_by_username("musicfan123").await.unwrap().unwrap();
    let upper = search.search_by_username("MUSICFAN123").await.unwrap().unwrap();
    assert_eq!(lower.username, upper.username);
}

#[tokio::test]
async fn test_search_for_missing_user() {
    let env = setup().await;
    assert!(env
        .services
        .search
        .search_by_username("ghostUser999")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_search_input_validation() {
    let env = setup().await;
    let search = &env.services.search;

    let err = search.search_by_username("").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(err.to_string(), "Please enter a username.");

    let err = search.search_by_username("   ").await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter valid text.");
}

#[tokio::test]
async fn test_partial_username_search() {
    let env = setup().await;
    create_user(&env.services, "musicFan123").await;
    create_user(&env.services, "MusicLover").await;
    create_user(&env.services, "jazzcat").await;
    let search = &env.services.search;

    let results = search.search_by_partial_username("music").await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(search.search_by_partial_username("zzz_").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_after_connection_loss() {
    let env = setup().await;
    env.pool.close().await;

    let err = env.services.search.search_by_username("anyUser").await.unwrap_err();
    assert!(matches!(err, Error::Unavailable(_)));
    assert_eq!(err.to_string(), "Unable to retrieve data.");
}

#[tokio::test]
async fn test_search_with_filters() {
    let env = setup().await;
    let a = create_user(&env.services, "chiRocker").await;
    let b = create_user(&env.services, "nyRocker").await;
    let c = create_user(&env.services, "chiJazz").await;
    set_details(&env, a.id, &["rock", "blues"], "Chicago").await;
    set_details(&env, b.id, &["rock"], "New York").await;
    set_details(&env, c.id, &["jazz"], "Chicago").await;
    let search = &env.services.search;

    let results = search.search_with_filters(Some("rock"), Some("Chicago")).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results
        .iter()
        .all(|p| p.genres.contains(&"rock".to_string()) && p.location == "Chicago"));

    assert_eq!(search.search_with_filters(Some("ROCK"), None).await.unwrap().len(), 2);
    assert_eq!(search.search_with_filters(None, Some("chicago")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_injection_text_matches_nothing() {
    let env = setup().await;
    create_user(&env.services, "innocent").await;

    assert!(env
        .services
        .search
        .search_by_username("' OR '1'='1")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_filters_match_punctuated_values() {
    let env = setup().await;
    let user = create_user(&env.services, "soulFan").await;
    set_details(&env, user.id, &["R&B", "r&b", "Drum 'n' Bass"], "St. John's").await;

    let profile = env.services.profile.get_profile(user.id).await.unwrap();
    assert_eq!(profile.genres, vec!["R&B", "Drum 'n' Bass"]);
    assert_eq!(profile.location, "St. John's");

    let search = &env.services.search;
    let by_genre = search.search_with_filters(Some("r&b"), None).await.unwrap();
    assert_eq!(by_genre.len(), 1);
    assert_eq!(by_genre[0].username, "soulFan");

    let by_location = search.search_with_filters(None, Some("st. john's")).await.unwrap();
    assert_eq!(by_location.len(), 1);

    let both = search
        .search_with_filters(Some("Drum 'n' Bass"), Some("St. John's"))
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
}
