//! bcrypt password hashing.

use crate::errors::{Error, Result};

/// Hashes `password` with the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(|e| Error::config(format!("Failed to hash password: {e}")))
}

/// Checks `password` against a stored hash. A malformed hash never verifies.
#[must_use]
pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}
