//! Album reviews and likes

mod common;

use common::{create_album, create_user, setup};
use mbxd_common::services::{NewReview, ReviewUpdate};
use mbxd_common::validation::is_text_sanitized;
use mbxd_common::Error;
use uuid::Uuid;

fn review(user_id: Uuid, album_id: Uuid, rating: Option<i64>, text: &str) -> NewReview {
    NewReview {
        user_id,
        album_id,
        rating,
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_submit_valid_review() {
    let env = setup().await;
    let user = create_user(&env.services, "critic").await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;

    let saved = env
        .services
        .reviews
        .submit_review(review(user.id, album.id, Some(5), "Amazing album!"))
        .await
        .unwrap();
    assert_eq!(saved.rating, 5);

    let stored = env.services.reviews.get_review(user.id, album.id).await.unwrap().unwrap();
    assert_eq!(stored.user_id, user.id);
    assert_eq!(stored.album_id, album.id);
    assert_eq!(stored.text, "Amazing album!");
}

#[tokio::test]
async fn test_review_validation_messages() {
    let env = setup().await;
    let user = create_user(&env.services, "picky").await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;
    let reviews = &env.services.reviews;

    let err = reviews.submit_review(review(user.id, album.id, Some(4), "")).await.unwrap_err();
    assert_eq!(err.to_string(), "Review cannot be empty.");

    let err = reviews.submit_review(review(user.id, album.id, None, "Great!")).await.unwrap_err();
    assert_eq!(err.to_string(), "Please provide a rating.");

    for rating in [6, 0, -1, 300] {
        let err = reviews
            .submit_review(review(user.id, album.id, Some(rating), "Great!"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Rating must be between 1 and 5.");
    }

    let err = reviews
        .submit_review(review(user.id, Uuid::new_v4(), Some(3), "Great!"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Album not found.");
}

#[tokio::test]
async fn test_duplicate_review_rejected() {
    let env = setup().await;
    let user = create_user(&env.services, "repeater").await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;
    let reviews = &env.services.reviews;

    reviews.submit_review(review(user.id, album.id, Some(5), "Loved it!")).await.unwrap();
    let err = reviews
        .submit_review(review(user.id, album.id, Some(5), "Loved it!"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(err.to_string(), "You’ve already reviewed this album.");
}

#[tokio::test]
async fn test_review_text_is_escaped() {
    let env = setup().await;
    let user = create_user(&env.services, "scripter").await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;

    let saved = env
        .services
        .reviews
        .submit_review(review(user.id, album.id, Some(1), "<script>alert('x')</script>"))
        .await
        .unwrap();
    assert!(is_text_sanitized(&saved.text));
    assert!(!saved.text.contains("<script>"));
}

#[tokio::test]
async fn test_album_reviews_from_many_users_newest_first() {
    let env = setup().await;
    let album = create_album(&env.services, "Kind of Blue", "Miles Davis").await;
    let reviews = &env.services.reviews;

    for name in ["first", "second", "third"] {
        let user = create_user(&env.services, name).await;
        reviews
            .submit_review(review(user.id, album.id, Some(4), &format!("{} take", name)))
            .await
            .unwrap();
    }

    let listed = reviews.get_reviews_for_album(album.id).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].username, "third");
    for pair in listed.windows(2) {
        assert!(pair[0].review.created_at >= pair[1].review.created_at);
    }

    let authors: std::collections::HashSet<&str> = listed.iter().map(|r| r.username.as_str()).collect();
    assert_eq!(authors.len(), 3);
}

#[tokio::test]
async fn test_album_without_reviews() {
    let env = setup().await;
    let album = create_album(&env.services, "Unheard", "Nobody").await;
    assert!(env.services.reviews.get_reviews_for_album(album.id).await.unwrap().is_empty());
    assert!(env
        .services
        .reviews
        .get_reviews_for_album(Uuid::new_v4())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_loading_reviews_after_connection_loss() {
    let env = setup().await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;

    env.pool.close().await;
    let err = env.services.reviews.get_reviews_for_album(album.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Unable to load reviews.");
}

#[tokio::test]
async fn test_edit_and_delete_by_author_only() {
    let env = setup().await;
    let author = create_user(&env.services, "author").await;
    let other = create_user(&env.services, "otherUser").await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;
    let reviews = &env.services.reviews;

    let saved = reviews
        .submit_review(review(author.id, album.id, Some(5), "Loved it!"))
        .await
        .unwrap();

    let update = ReviewUpdate {
        rating: Some(3),
        text: Some("Not bad".to_string()),
    };
    let err = reviews.edit_review(other.id, saved.id, update.clone()).await.unwrap_err();
    assert!(matches!(err, Error::AccessDenied));
    assert_eq!(err.to_string(), "Access denied.");

    let err = reviews.delete_review(other.id, saved.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Access denied.");

    let edited = reviews
        .edit_review(
            author.id,
            saved.id,
            ReviewUpdate {
                rating: Some(4),
                text: Some("Still good!".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.rating, 4);
    assert_eq!(edited.text, "Still good!");

    let err = reviews
        .edit_review(author.id, saved.id, ReviewUpdate { rating: Some(0), text: None })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Rating must be between 1 and 5.");

    reviews.delete_review(author.id, saved.id).await.unwrap();
    let err = reviews.delete_review(author.id, saved.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Review not found.");
    assert!(reviews.get_review(author.id, album.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_review_count_grows_per_submission() {
    let env = setup().await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;
    let first = create_user(&env.services, "counter1").await;
    let second = create_user(&env.services, "counter2").await;
    let reviews = &env.services.reviews;

    reviews.submit_review(review(first.id, album.id, Some(5), "Great")).await.unwrap();
    let before = reviews.get_review_count(album.id).await.unwrap();
    reviews.submit_review(review(second.id, album.id, Some(4), "Nice!")).await.unwrap();
    assert_eq!(reviews.get_review_count(album.id).await.unwrap(), before + 1);
    assert_eq!(reviews.get_user_reviews(second.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_likes_are_idempotent() {
    let env = setup().await;
    let author = create_user(&env.services, "liked").await;
    let fan = create_user(&env.services, "fan").await;
    let album = create_album(&env.services, "Blue", "Joni Mitchell").await;
    let reviews = &env.services.reviews;

    let saved = reviews.submit_review(review(author.id, album.id, Some(5), "Wow")).await.unwrap();

    assert_eq!(reviews.like_review(fan.id, saved.id).await.unwrap(), 1);
    assert_eq!(reviews.like_review(fan.id, saved.id).await.unwrap(), 1);
    assert_eq!(reviews.get_reviews_for_album(album.id).await.unwrap()[0].like_count, 1);

    assert_eq!(reviews.unlike_review(fan.id, saved.id).await.unwrap(), 0);
    assert_eq!(reviews.unlike_review(fan.id, saved.id).await.unwrap(), 0);

    let err = reviews.like_review(fan.id, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), "Review not found.");
}
