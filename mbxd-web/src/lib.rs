//! mbxd-web library - Musicboxd HTTP API
//!
//! JSON API over the shared services. Public routes cover sign-up, login,
//! recovery, user search and reading album reviews; everything that changes
//! a user's data requires `Authorization: Bearer <session token>`.

use axum::Router;
use mbxd_common::Services;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod notify;

use notify::{ResetNotifier, UndeliveredResetNotifier};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub reset_notifier: Arc<dyn ResetNotifier>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self::with_notifier(services, Arc::new(UndeliveredResetNotifier))
    }

    pub fn with_notifier(services: Services, reset_notifier: Arc<dyn ResetNotifier>) -> Self {
        Self {
            services,
            reset_notifier,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Protected routes (require a live session)
    let protected = Router::new()
        .route("/api/auth/logout", post(api::logout))
        .route("/api/profile", get(api::get_profile).put(api::update_profile))
        .route("/api/profile/export", get(api::export_profile))
        .route("/api/profile/import", post(api::import_profile))
        .route("/api/profile/top-songs", get(api::get_top_songs).post(api::add_top_song))
        .route(
            "/api/profile/top-songs/reorder",
            post(api::reorder_top_songs),
        )
        .route(
            "/api/profile/top-songs/:index",
            put(api::edit_top_song).delete(api::delete_top_song),
        )
        .route("/api/profile/top-albums", get(api::get_top_albums).post(api::add_top_album))
        .route(
            "/api/profile/top-albums/reorder",
            post(api::reorder_top_albums),
        )
        .route(
            "/api/profile/top-albums/:index",
            put(api::edit_top_album).delete(api::delete_top_album),
        )
        .route("/api/lists", get(api::get_user_lists))
        .route("/api/lists/:name", put(api::update_list).delete(api::delete_list))
        .route("/api/lists/:name/albums", post(api::add_album_to_list))
        .route(
            "/api/lists/:name/albums/:title",
            axum::routing::delete(api::remove_album_from_list),
        )
        .route("/api/users/:username/lists/:name", get(api::view_list))
        .route("/api/albums", post(api::add_album))
        .route("/api/reviews", post(api::submit_review))
        .route("/api/reviews/:id", put(api::edit_review).delete(api::delete_review))
        .route("/api/reviews/:id/like", post(api::like_review).delete(api::unlike_review))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/auth/signup", post(api::sign_up))
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/password-reset", post(api::send_password_reset))
        .route("/api/auth/password-reset/confirm", post(api::reset_password))
        .route("/api/auth/forgot-username", post(api::retrieve_username))
        .route("/api/users/search", get(api::search_users))
        .route("/api/users/filter", get(api::filter_users))
        .route("/api/users/:username", get(api::get_user))
        .route("/api/albums/search", get(api::search_albums))
        .route("/api/albums/:id/reviews", get(api::get_album_reviews))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
