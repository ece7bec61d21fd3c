// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication middleware for Axum.
//!
//! [`auth_layer`] resolves the caller from the `stage_session` cookie or an
//! `Authorization: Bearer` token (opaque session token or signed token), loads
//! the profile, and stores an [`AuthContext`] as a request extension. It never
//! rejects a request itself: routes such as `/api/health` and `/api/auth/login`
//! must keep working with a stale cookie. Handlers opt in through extractors:
//!
//! - [`RequireAuth`]: an authenticated, **active** principal. Inactive profiles
//!   are refused with 403 before any policy runs.
//! - [`RequireIdentity`]: any resolved principal, active or not. Only used by
//!   `/api/auth/me` and `/api/auth/logout`.
//!
//! # Token priority
//!
//! 1. Session cookie
//! 2. Bearer token, used when there is no cookie or the cookie did not resolve
//!
//! # Security
//!
//! - Tokens are hashed before lookup; raw tokens are never logged
//! - The role claim of a signed token is compared with the stored role and a
//!   mismatch is logged; the stored role always wins
//! - A signed token bound to a session (`sid` claim) stops resolving once that
//!   session is deleted or expires
//! - A valid credential whose user has no profile row is reported as
//!   `profile_not_found` (404), distinct from `unauthenticated` (401)

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::Response,
};
use stage_server_auth::{
	hash_token,
	middleware::{identify_bearer_token, BearerTokenType},
	AuthContext, AuthError, CredentialSource, CurrentUser, Principal, UserId,
};
use tracing::instrument;

use crate::{api::AppState, error::ServerError};

/// Why no [`CurrentUser`] was resolved. Stored next to an unauthenticated
/// [`AuthContext`] so extractors can answer with the right status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
	/// No credential, or one that is unknown, expired or badly signed.
	Unauthenticated,
	/// The credential is valid but its user has no profile row.
	ProfileNotFound(UserId),
	/// A store lookup failed while resolving the caller.
	Internal,
}

impl From<AuthFailure> for ServerError {
	fn from(failure: AuthFailure) -> Self {
		match failure {
			AuthFailure::Unauthenticated => ServerError::Unauthenticated,
			AuthFailure::ProfileNotFound(id) => ServerError::ProfileNotFound(id),
			AuthFailure::Internal => ServerError::Internal("identity resolution failed".to_string()),
		}
	}
}

/// Resolve the caller and attach the outcome to the request.
#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		auth_method = tracing::field::Empty,
		user_id = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let span = tracing::Span::current();

	match resolve_caller(&state, request.headers()).await {
		Ok(current_user) => {
			span.record("auth_method", credential_label(current_user.source));
			span.record("user_id", tracing::field::display(&current_user.principal.id));
			request
				.extensions_mut()
				.insert(AuthContext::authenticated(current_user));
		}
		Err(failure) => {
			span.record("auth_method", "none");
			request
				.extensions_mut()
				.insert(AuthContext::unauthenticated());
			request.extensions_mut().insert(failure);
		}
	}

	next.run(request).await
}

fn credential_label(source: CredentialSource) -> &'static str {
	match source {
		CredentialSource::SessionCookie => "session_cookie",
		CredentialSource::BearerSession => "bearer_session",
		CredentialSource::SignedToken => "signed_token",
	}
}

async fn resolve_caller(
	state: &AppState,
	headers: &axum::http::HeaderMap,
) -> Result<CurrentUser, AuthFailure> {
	let cookie = stage_server_auth::extract_session_cookie(headers);
	let bearer = stage_server_auth::extract_bearer_token(headers);

	if let Some(token) = cookie {
		match authenticate_session(state, &token, CredentialSource::SessionCookie).await {
			Ok(user) => return Ok(user),
			Err(failure) if bearer.is_none() => return Err(failure),
			Err(_) => tracing::debug!("session cookie did not resolve, trying bearer token"),
		}
	}

	let Some(token) = bearer else {
		return Err(AuthFailure::Unauthenticated);
	};

	match identify_bearer_token(&token) {
		BearerTokenType::Session => {
			authenticate_session(state, &token, CredentialSource::BearerSession).await
		}
		BearerTokenType::Signed => authenticate_signed_token(state, &token).await,
		BearerTokenType::Unknown => {
			tracing::debug!("unknown bearer token format");
			Err(AuthFailure::Unauthenticated)
		}
	}
}

/// Authenticate an opaque session token, from the cookie or a bearer header.
#[instrument(skip(state, token), fields(session_id = tracing::field::Empty))]
async fn authenticate_session(
	state: &AppState,
	token: &str,
	source: CredentialSource,
) -> Result<CurrentUser, AuthFailure> {
	let token_hash = hash_token(token);

	let session = match state.session_repo.get_session_by_token_hash(&token_hash).await {
		Ok(Some(session)) => session,
		Ok(None) => {
			tracing::debug!("session not found for token hash");
			return Err(AuthFailure::Unauthenticated);
		}
		Err(e) => {
			tracing::error!(error = %e, "failed to look up session");
			return Err(AuthFailure::Internal);
		}
	};

	tracing::Span::current().record("session_id", tracing::field::display(&session.id));

	if session.is_expired() {
		tracing::debug!(session_id = %session.id, "session expired");
		return Err(AuthFailure::Unauthenticated);
	}

	let principal = load_profile(state, session.user_id).await?;

	let session_id = session.id;
	let session_repo = state.session_repo.clone();
	tokio::spawn(async move {
		if let Err(e) = session_repo.touch_session(&session_id).await {
			tracing::warn!(error = %e, "failed to update session last used");
		}
	});

	Ok(CurrentUser::from_session(principal, session.id, source))
}

/// Authenticate a signed bearer token.
#[instrument(skip(state, token))]
async fn authenticate_signed_token(state: &AppState, token: &str) -> Result<CurrentUser, AuthFailure> {
	let claims = match state.jwt.verify(token) {
		Ok(claims) => claims,
		Err(e) => {
			tracing::debug!(error = %e, "signed token rejected");
			return Err(AuthFailure::Unauthenticated);
		}
	};
	let user_id = claims
		.user_id()
		.map_err(|_| AuthFailure::Unauthenticated)?;
	let session_id = claims
		.session_id()
		.map_err(|_| AuthFailure::Unauthenticated)?;

	if let Some(session_id) = session_id {
		match state.session_repo.get_session(&session_id).await {
			Ok(Some(session)) if session.user_id == user_id && !session.is_expired() => {}
			Ok(_) => {
				tracing::debug!(session_id = %session_id, "signed token's session has ended");
				return Err(AuthFailure::Unauthenticated);
			}
			Err(e) => {
				tracing::error!(error = %e, "failed to look up session");
				return Err(AuthFailure::Internal);
			}
		}
	}

	let principal = load_profile(state, user_id).await?;

	if let Some(hint) = claims.role {
		if hint != principal.role {
			tracing::warn!(
				user_id = %user_id,
				token_role = %hint,
				stored_role = %principal.role,
				"token role claim differs from stored role; using stored role"
			);
		}
	}

	Ok(CurrentUser::from_signed_token(principal, session_id))
}

async fn load_profile(state: &AppState, user_id: UserId) -> Result<Principal, AuthFailure> {
	match state.user_repo.get_user_by_id(&user_id).await {
		Ok(Some(principal)) => Ok(principal),
		Ok(None) => {
			tracing::warn!(user_id = %user_id, "no profile for authenticated user");
			Err(AuthFailure::ProfileNotFound(user_id))
		}
		Err(e) => {
			tracing::error!(error = %e, "failed to load profile");
			Err(AuthFailure::Internal)
		}
	}
}

fn resolved_user(parts: &Parts) -> Result<CurrentUser, ServerError> {
	let auth_ctx = parts
		.extensions
		.get::<AuthContext>()
		.cloned()
		.unwrap_or_else(AuthContext::unauthenticated);

	match auth_ctx.current_user {
		Some(user) => Ok(user),
		None => {
			let failure = parts
				.extensions
				.get::<AuthFailure>()
				.copied()
				.unwrap_or(AuthFailure::Unauthenticated);
			tracing::debug!(?failure, "authentication required: no principal");
			Err(failure.into())
		}
	}
}

/// Extractor that requires an authenticated, active principal.
///
/// ```ignore
/// async fn handler(RequireAuth(current_user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", current_user.principal.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let user = resolved_user(parts)?;
		if !user.principal.is_active {
			tracing::warn!(user_id = %user.principal.id, "inactive principal refused");
			return Err(AuthError::AccountInactive.into());
		}
		Ok(RequireAuth(user))
	}
}

/// Extractor that requires a resolved principal whether or not it is active.
pub struct RequireIdentity(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireIdentity
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	#[instrument(name = "RequireIdentity::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		resolved_user(parts).map(RequireIdentity)
	}
}
