// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization error types.

use thiserror::Error;

use crate::UserId;

/// Errors that can occur while resolving identity or evaluating policy.
#[derive(Debug, Error)]
pub enum AuthError {
	// =========================================================================
	// Authentication Errors
	// =========================================================================
	/// No credentials were provided.
	#[error("authentication required")]
	AuthenticationRequired,

	/// Email/password pair did not match.
	#[error("invalid credentials")]
	InvalidCredentials,

	/// Session cookie or opaque token does not match any live session.
	#[error("session not found")]
	SessionNotFound,

	/// The session has expired.
	#[error("session expired")]
	SessionExpired,

	/// The signed bearer token failed verification.
	#[error("invalid access token")]
	InvalidAccessToken,

	/// The signed bearer token is past its `exp`.
	#[error("access token expired")]
	AccessTokenExpired,

	// =========================================================================
	// Profile Errors
	// =========================================================================
	/// Authenticated identity has no application profile.
	#[error("profile not found for user {0}")]
	ProfileNotFound(UserId),

	/// The profile exists but has been deactivated.
	#[error("account inactive")]
	AccountInactive,

	// =========================================================================
	// Authorization Errors
	// =========================================================================
	/// Denied by the access policy.
	#[error("access denied")]
	AccessDenied,

	/// Forbidden operation with a specific reason.
	#[error("forbidden: {0}")]
	Forbidden(String),

	/// Bootstrap provisioning is not available in this environment.
	#[error("bootstrap provisioning disabled")]
	BootstrapDisabled,

	// =========================================================================
	// Infrastructure Errors
	// =========================================================================
	/// Password hashing failed.
	#[error("hashing error: {0}")]
	HashingError(String),

	/// Token signing failed.
	#[error("token signing error: {0}")]
	Signing(String),

	/// Internal error.
	#[error("internal error: {0}")]
	Internal(String),
}

impl AuthError {
	/// Returns true if this error should be logged at error level.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			AuthError::HashingError(_) | AuthError::Signing(_) | AuthError::Internal(_)
		)
	}

	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			// 401 Unauthorized
			AuthError::AuthenticationRequired
			| AuthError::InvalidCredentials
			| AuthError::SessionNotFound
			| AuthError::SessionExpired
			| AuthError::InvalidAccessToken
			| AuthError::AccessTokenExpired => 401,

			// 403 Forbidden
			AuthError::AccountInactive | AuthError::AccessDenied | AuthError::Forbidden(_) => 403,

			// 404 Not Found
			AuthError::ProfileNotFound(_) | AuthError::BootstrapDisabled => 404,

			// 500 Internal Server Error
			AuthError::HashingError(_) | AuthError::Signing(_) | AuthError::Internal(_) => 500,
		}
	}

	/// Stable machine-readable code used in the JSON error envelope.
	pub fn code(&self) -> &'static str {
		match self.status_code() {
			401 => "unauthenticated",
			403 => "forbidden",
			404 => match self {
				AuthError::ProfileNotFound(_) => "profile_not_found",
				_ => "not_found",
			},
			_ => "internal_error",
		}
	}
}
