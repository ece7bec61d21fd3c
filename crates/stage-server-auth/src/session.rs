// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login sessions.
//!
//! A session is created by the login endpoint and referenced by an opaque token,
//! sent either as the `stage_session` cookie or as a bearer token. Only the SHA-256
//! hash of the token is stored; the raw token is returned to the client once.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::{SessionId, UserId};

/// Bytes of randomness in a session token (64 hex characters).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// A login session for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	pub id: SessionId,
	pub user_id: UserId,
	pub created_at: DateTime<Utc>,
	pub last_used_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl Session {
	/// Create a session that expires `ttl` from now.
	#[instrument(level = "debug", skip(user_id), fields(user_id = %user_id))]
	pub fn new(user_id: UserId, ttl: Duration) -> Self {
		let now = Utc::now();
		Self {
			id: SessionId::generate(),
			user_id,
			created_at: now,
			last_used_at: now,
			expires_at: now + ttl,
		}
	}

	pub fn is_expired(&self) -> bool {
		self.is_expired_at(Utc::now())
	}

	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}
}

/// Generates a cryptographically secure random session token.
pub fn generate_session_token() -> String {
	use rand::Rng;
	let mut rng = rand::thread_rng();
	let bytes: [u8; SESSION_TOKEN_BYTES] = rng.gen();
	hex::encode(bytes)
}

/// Hash a token for storage and lookup.
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

/// True when the string has the shape of a token produced by
/// [`generate_session_token`]. Used to tell opaque tokens apart from signed ones.
pub fn is_session_token_format(token: &str) -> bool {
	token.len() == SESSION_TOKEN_BYTES * 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}
