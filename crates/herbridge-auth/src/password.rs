// Copyright (c) 2025 HerBridge contributors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password hashing.
//!
//! Passwords are hashed with Argon2id and a random salt, and stored as PHC
//! strings (`$argon2id$v=19$...`). Plaintext only ever arrives wrapped in a
//! [`SecretString`].

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use herbridge_common_secret::SecretString;

use crate::argon2_config::argon2_instance;
use crate::error::AuthError;

/// Hashes a password for storage.
#[tracing::instrument(skip_all)]
pub fn hash_password(password: &SecretString) -> Result<String, AuthError> {
	let salt = SaltString::generate(&mut OsRng);

	argon2_instance()
		.hash_password(password.expose().as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch and an error only if the stored hash is
/// not a valid PHC string.
pub fn verify_password(password: &SecretString, hash: &str) -> Result<bool, AuthError> {
	let parsed = PasswordHash::new(hash)
		.map_err(|e| AuthError::PasswordHash(format!("invalid stored hash: {e}")))?;

	Ok(argon2_instance()
		.verify_password(password.expose().as_bytes(), &parsed)
		.is_ok())
}
