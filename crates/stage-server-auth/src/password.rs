// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password hashing for the email/password login.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::argon2_config::argon2_instance;
use crate::AuthError;

/// Shortest password accepted at provisioning time.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Stand-in hash for accounts that do not exist or have no password.
static DUMMY_HASH: LazyLock<String> =
	LazyLock::new(|| hash_password("stage-unusable-password").unwrap_or_default());

/// Hash a password into a PHC string suitable for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Verify a password against its stored PHC string.
///
/// Malformed hashes verify as false rather than erroring.
pub fn verify_password(password: &str, hash: &str) -> bool {
	let Ok(parsed) = PasswordHash::new(hash) else {
		return false;
	};
	argon2_instance()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok()
}

/// Verify a login attempt. When there is no stored hash the password is still
/// checked against a stand-in hash, so unknown accounts cost the same Argon2
/// run as known ones, and the result is always false.
pub fn verify_login_password(password: &str, hash: Option<&str>) -> bool {
	match hash {
		Some(hash) => verify_password(password, hash),
		None => {
			let _ = verify_password(password, &DUMMY_HASH);
			false
		}
	}
}
