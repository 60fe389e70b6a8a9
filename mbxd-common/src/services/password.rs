//! Salted password hashing
//!
//! SHA-256 over `salt || password`, stretched by repeated hashing. Hashes
//! and salts are stored as lowercase hex.

use rand::Rng;
use sha2::{Digest, Sha256};

const STRETCH_ROUNDS: usize = 10_000;

/// Random 16-byte salt as hex
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    to_hex(&bytes)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..STRETCH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(digest);
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

/// Compare without short-circuiting on the first differing byte
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    if calculated.len() != expected_hash.len() {
        return false;
    }
    calculated
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
