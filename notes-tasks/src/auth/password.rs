//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...`) which carry their
//! own salt and parameters, so verification needs nothing but the string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{Error, Result};

#[cfg(not(test))]
fn argon2() -> Argon2<'static> {
    Argon2::default()
}

// Minimum cost keeps the test suite fast; production uses the crate defaults.
#[cfg(test)]
fn argon2() -> Argon2<'static> {
    let params = argon2::Params::new(64, 1, 1, None).unwrap_or_default();
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Unexpected(format!("failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch, `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| Error::Unexpected(format!("invalid password hash: {e}")))?;

    Ok(argon2().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

/// Runs hashing off the async workers.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?
}
