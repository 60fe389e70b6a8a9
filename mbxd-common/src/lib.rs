//! # Musicboxd Common Library
//!
//! Shared code for the Musicboxd binaries (HTTP API and terminal shell):
//! - Database initialization and runtime settings
//! - Configuration loading, root folder resolution and logging setup
//! - Input validation and sanitization
//! - Services: authentication, profiles and top charts, album lists,
//!   album catalog, reviews, user search

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod services;
pub mod uuid_utils;
pub mod validation;

pub use error::{Error, Result};
pub use services::Services;
