// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential extraction and the per-request authentication context.
//!
//! # Authentication Flow
//!
//! ```text
//! Request → Cookie / Authorization header → Identify credential → Resolve → AuthContext
//!                                               │
//!                                               ├── stage_session cookie → session lookup
//!                                               ├── Bearer <64 hex>      → session lookup
//!                                               └── Bearer <a.b.c>       → signature check
//! ```
//!
//! Whatever the credential, the result is a user id. The profile is then loaded
//! from the store and becomes the [`CurrentUser`] for the request.
//!
//! Token values are never logged.

use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use tracing::instrument;

use crate::jwt::looks_like_jwt;
use crate::session::is_session_token_format;
use crate::{Principal, SessionId};

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "stage_session";

/// How the caller proved their identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
	/// `stage_session` cookie.
	SessionCookie,
	/// Opaque session token in the Authorization header.
	BearerSession,
	/// Signed token in the Authorization header.
	SignedToken,
}

/// The authenticated caller, with their profile already loaded.
#[derive(Debug, Clone)]
pub struct CurrentUser {
	pub principal: Principal,
	pub source: CredentialSource,
	/// Session backing the credential, if it was a session.
	pub session_id: Option<SessionId>,
}

impl CurrentUser {
	pub fn from_session(principal: Principal, session_id: SessionId, source: CredentialSource) -> Self {
		Self {
			principal,
			source,
			session_id: Some(session_id),
		}
	}

	/// A signed token minted at login names its session in the `sid` claim, so
	/// ending that session revokes the token too.
	pub fn from_signed_token(principal: Principal, session_id: Option<SessionId>) -> Self {
		Self {
			principal,
			source: CredentialSource::SignedToken,
			session_id,
		}
	}
}

/// Authentication context inserted as a request extension.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self { current_user: None }
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			current_user: Some(current_user),
		}
	}
}

/// Extract the session token from the `stage_session` cookie.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
	extract_session_cookie_with_name(headers, SESSION_COOKIE_NAME)
}

/// Extract a cookie value by name. Multiple Cookie headers are all searched.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			if name == cookie_name && !value.is_empty() {
				Some(value.to_string())
			} else {
				None
			}
		})
}

/// Extract bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`. The scheme is matched
/// case-insensitively.
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
	let (scheme, token) = auth_str.split_once(' ')?;
	if !scheme.eq_ignore_ascii_case("bearer") {
		return None;
	}
	let token = token.trim();
	if token.is_empty() {
		None
	} else {
		Some(token.to_string())
	}
}

/// Kind of bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerTokenType {
	Session,
	Signed,
	Unknown,
}

pub fn identify_bearer_token(token: &str) -> BearerTokenType {
	if is_session_token_format(token) {
		BearerTokenType::Session
	} else if looks_like_jwt(token) {
		BearerTokenType::Signed
	} else {
		BearerTokenType::Unknown
	}
}

/// `Set-Cookie` value for a freshly created session.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
	let mut cookie = format!(
		"{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
	);
	if secure {
		cookie.push_str("; Secure");
	}
	cookie
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> String {
	format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
