//! HTTP API handlers for mbxd-web

pub mod albums;
pub mod auth;
pub mod health;
pub mod lists;
pub mod profile;
pub mod reviews;
pub mod users;

pub use albums::{add_album, get_album_reviews, search_albums};
pub use auth::{
    auth_middleware, login, logout, reset_password, retrieve_username, send_password_reset,
    sign_up, CurrentUser,
};
pub use health::health_routes;
pub use lists::{
    add_album_to_list, delete_list, get_user_lists, remove_album_from_list, update_list, view_list,
};
pub use profile::{
    add_top_album, add_top_song, delete_top_album, delete_top_song, edit_top_album, edit_top_song,
    export_profile, get_profile, get_top_albums, get_top_songs, import_profile, reorder_top_albums,
    reorder_top_songs, update_profile,
};
pub use reviews::{delete_review, edit_review, like_review, submit_review, unlike_review};
pub use users::{filter_users, get_user, search_users};
