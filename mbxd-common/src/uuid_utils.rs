//! UUID utilities

use crate::{Error, Result};
use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a stored guid column
pub fn parse(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Corrupt guid {:?}: {}", s, e)))
}

/// Parse a guid supplied by a caller; malformed ids are reported as not found
pub fn parse_id(s: &str, not_found: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim()).map_err(|_| Error::not_found(not_found))
}
