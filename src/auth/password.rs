// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), which embed the
//! algorithm parameters and the per-password salt. Salts come from the
//! system CSPRNG. Verification is delegated to the argon2 crate, which
//! compares in constant time.
//!
//! Both functions are CPU-bound; async callers run them on the blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use ring::rand::{SecureRandom, SystemRandom};

use super::AuthError;

/// Salt length in bytes (128 bits).
const SALT_LEN: usize = 16;

/// Hash a secret with a fresh random salt.
pub fn hash_password(secret: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt_bytes)
        .map_err(|_| AuthError::InternalError("system RNG unavailable".to_string()))?;

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::InternalError(format!("salt encoding failed: {e}")))?;

    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Check a secret against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch. A stored hash that cannot be parsed is
/// an internal error, not a credential failure.
pub fn verify_password(secret: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::InternalError(format!("stored password hash is invalid: {e}")))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
