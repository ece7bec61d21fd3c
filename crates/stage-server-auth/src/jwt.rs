// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signed bearer tokens (HS256).
//!
//! A signed token carries `sub` (user id) and `email`. It may also carry a
//! `role` claim, which is informational only: the profile store decides the
//! caller's role. Tokens issued at login carry `sid`, the login session's id;
//! such a token is only honoured while that session exists.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{AuthError, Role, SessionId, UserId};

/// Claims carried by a Stage bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	pub sub: String,
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<Role>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sid: Option<String>,
	pub exp: i64,
	pub iat: i64,
	pub iss: String,
}

impl Claims {
	pub fn user_id(&self) -> Result<UserId, AuthError> {
		self.sub.parse().map_err(|_| AuthError::InvalidAccessToken)
	}

	/// The bound login session, if any. A present but malformed `sid` is invalid.
	pub fn session_id(&self) -> Result<Option<SessionId>, AuthError> {
		self.sid
			.as_deref()
			.map(|sid| sid.parse().map_err(|_| AuthError::InvalidAccessToken))
			.transpose()
	}
}

/// Issues and verifies signed bearer tokens.
#[derive(Clone)]
pub struct JwtService {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	issuer: String,
	ttl: Duration,
}

impl std::fmt::Debug for JwtService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("JwtService")
			.field("issuer", &self.issuer)
			.field("ttl", &self.ttl)
			.finish_non_exhaustive()
	}
}

impl JwtService {
	pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			issuer: issuer.into(),
			ttl,
		}
	}

	pub fn issuer(&self) -> &str {
		&self.issuer
	}

	/// Issue a token for the given user. `role` is embedded as a hint. A token
	/// bound to `session_id` is refused once that session ends.
	#[instrument(level = "debug", skip(self, email), fields(user_id = %user_id))]
	pub fn issue(
		&self,
		user_id: UserId,
		email: &str,
		role: Option<Role>,
		session_id: Option<SessionId>,
	) -> Result<String, AuthError> {
		let now = Utc::now();
		let claims = Claims {
			sub: user_id.to_string(),
			email: email.to_string(),
			role,
			sid: session_id.map(|id| id.to_string()),
			exp: (now + self.ttl).timestamp(),
			iat: now.timestamp(),
			iss: self.issuer.clone(),
		};
		self.sign(&claims)
	}

	/// Sign arbitrary claims with this service's key.
	pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
		encode(&Header::default(), claims, &self.encoding_key).map_err(|e| AuthError::Signing(e.to_string()))
	}

	/// Verify signature, issuer and expiry.
	pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
		let mut validation = Validation::default();
		validation.set_issuer(&[&self.issuer]);
		validation.leeway = 0;

		decode::<Claims>(token, &self.decoding_key, &validation)
			.map(|data| data.claims)
			.map_err(|e| match e.kind() {
				ErrorKind::ExpiredSignature => AuthError::AccessTokenExpired,
				_ => AuthError::InvalidAccessToken,
			})
	}
}

/// Cheap structural check: three dot-separated segments.
pub fn looks_like_jwt(token: &str) -> bool {
	token.split('.').count() == 3 && !token.contains(' ')
}
