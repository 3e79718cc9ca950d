//! Salted password verifier for admin credentials.
//!
//! Format: `salt_hex$digest_hex` where the digest is SHA-256 over
//! `salt_hex || password`. This is an internal admin credential, not a
//! user-facing password system.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

const SALT_LEN: usize = 16;

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex(&hasher.finalize())
}

/// Hashes a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let salt_hex = hex(&salt);
    format!("{salt_hex}${}", digest(&salt_hex, password))
}

/// Checks a plaintext password against a stored verifier.
#[must_use]
pub fn verify_password(stored: &str, password: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    digest(salt_hex, password) == expected
}
