// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login, logout and self-service on the caller's own account.

use axum::{
	extract::State,
	http::header::SET_COOKIE,
	response::IntoResponse,
	Json,
};
use chrono::Utc;
use serde_json::json;
use stage_server_api::{
	ApiResponse, ChangePasswordRequest, ErrorResponse, LoginRequest, LoginResponse,
	UpdateProfileRequest, UserResponse,
};
use stage_server_auth::{
	generate_session_token, hash_password, hash_token,
	middleware::{clear_session_cookie, session_cookie},
	verify_login_password, Action, AuditEventType, AuthError, ResourceAttrs, Session,
	MIN_PASSWORD_LEN,
};
use stage_server_db::AuditEntry;

use super::{authorize, record_audit};
use crate::{
	api::AppState,
	auth_middleware::{RequireAuth, RequireIdentity},
	error::ServerError,
	validation::{optional_text, sanitize_email, MIN_NAME_LEN},
};

/// Run an Argon2 verification on the blocking pool.
async fn verify_blocking(password: String, hash: Option<String>) -> Result<bool, ServerError> {
	tokio::task::spawn_blocking(move || verify_login_password(&password, hash.as_deref()))
		.await
		.map_err(|e| ServerError::Internal(format!("password verification task failed: {e}")))
}

/// POST /api/auth/login - Exchange email and password for a session.
///
/// Sets the `stage_session` cookie and also returns a signed bearer token for
/// clients that cannot hold cookies. The token is bound to the session and
/// stops working at logout. Unknown email, missing password and wrong password
/// all answer the same 401 after the same amount of hashing work.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account inactive", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip(state, body))]
pub async fn login(
	State(state): State<AppState>,
	Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let email = sanitize_email(&body.email);

	let (principal, stored_hash) = match state.user_repo.get_credentials_by_email(&email).await? {
		Some((principal, hash)) => (Some(principal), hash),
		None => (None, None),
	};
	let verified = verify_blocking(body.password, stored_hash).await?;

	let principal = match (principal, verified) {
		(Some(principal), true) => principal,
		(Some(principal), false) => {
			tracing::warn!(user_id = %principal.id, "login refused: wrong or unset password");
			return Err(AuthError::InvalidCredentials.into());
		}
		(None, _) => {
			tracing::info!("login refused: unknown account");
			return Err(AuthError::InvalidCredentials.into());
		}
	};
	if !principal.is_active {
		tracing::warn!(user_id = %principal.id, "login refused: account inactive");
		return Err(AuthError::AccountInactive.into());
	}

	let token = generate_session_token();
	let session = Session::new(principal.id, state.session_ttl);
	state
		.session_repo
		.create_session(&session, &hash_token(&token))
		.await?;

	let bearer = state.jwt.issue(
		principal.id,
		&principal.email,
		Some(principal.role),
		Some(session.id),
	)?;

	tracing::info!(user_id = %principal.id, role = %principal.role, session_id = %session.id, "user logged in");

	let cookie = session_cookie(&token, state.session_ttl.num_seconds(), state.cookie_secure);
	let response = LoginResponse {
		token: bearer,
		token_type: "Bearer".to_string(),
		expires_at: Utc::now() + state.jwt_ttl,
		user: UserResponse::from(&principal),
	};

	Ok(([(SET_COOKIE, cookie)], Json(ApiResponse::ok(response))))
}

/// POST /api/auth/logout - End the current session.
///
/// Deleting the session also revokes the signed token issued with it. A signed
/// token that names no session has no server-side state; for it this only
/// clears the cookie and the token stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.principal.id))]
pub async fn logout(
	RequireIdentity(current_user): RequireIdentity,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	if let Some(session_id) = current_user.session_id {
		state.session_repo.delete_session(&session_id).await?;
		tracing::info!(session_id = %session_id, "session ended");
	}

	Ok((
		[(SET_COOKIE, clear_session_cookie())],
		Json(ApiResponse::ok(()).with_message("Logged out")),
	))
}

/// GET /api/auth/me - The caller's profile, including when inactive.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current profile", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "No profile for this identity", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(RequireIdentity(current_user): RequireIdentity) -> impl IntoResponse {
	Json(ApiResponse::ok(UserResponse::from(&current_user.principal)))
}

/// PATCH /api/auth/me - Edit the caller's name and contact details.
///
/// Email, role and status are not editable here.
#[utoipa::path(
    patch,
    path = "/api/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid or empty update", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Account inactive", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.principal.id))]
pub async fn update_me(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let mut principal = current_user.principal;
	authorize(&principal, Action::Update, &ResourceAttrs::user(Some(principal.id)))?;

	if body.is_empty() {
		return Err(ServerError::field("name", "at least one profile field is required"));
	}

	if let Some(name) = body.name {
		let name = name.trim();
		if name.chars().count() < MIN_NAME_LEN {
			return Err(ServerError::field(
				"name",
				format!("must be at least {MIN_NAME_LEN} characters"),
			));
		}
		principal.name = name.to_string();
	}
	if body.phone.is_some() {
		principal.phone = optional_text(body.phone);
	}
	if body.department.is_some() {
		principal.department = optional_text(body.department);
	}
	if body.position.is_some() {
		principal.position = optional_text(body.position);
	}
	if body.address.is_some() {
		principal.address = optional_text(body.address);
	}
	principal.updated_at = Utc::now();

	if !state.user_repo.update_profile(&principal).await? {
		return Err(ServerError::NotFound(format!("user {}", principal.id)));
	}
	tracing::info!("profile updated");

	Ok(Json(
		ApiResponse::ok(UserResponse::from(&principal)).with_message("Profile updated"),
	))
}

/// POST /api/auth/password - Change the caller's password.
///
/// The current password must verify. Existing sessions stay valid.
#[utoipa::path(
    post,
    path = "/api/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new password", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Account inactive", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.principal.id))]
pub async fn change_password(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	authorize(principal, Action::Update, &ResourceAttrs::user(Some(principal.id)))?;

	if body.new_password.chars().count() < MIN_PASSWORD_LEN {
		return Err(ServerError::field(
			"new_password",
			format!("must be at least {MIN_PASSWORD_LEN} characters"),
		));
	}

	let stored_hash = state
		.user_repo
		.get_credentials_by_email(&principal.email)
		.await?
		.and_then(|(_, hash)| hash);
	if !verify_blocking(body.current_password, stored_hash).await? {
		tracing::warn!("password change refused: current password does not verify");
		return Err(ServerError::field("current_password", "is incorrect"));
	}

	let new_password = body.new_password;
	let new_hash = tokio::task::spawn_blocking(move || hash_password(&new_password))
		.await
		.map_err(|e| ServerError::Internal(format!("password hashing task failed: {e}")))??;

	if !state.user_repo.set_password_hash(&principal.id, &new_hash).await? {
		return Err(ServerError::NotFound(format!("user {}", principal.id)));
	}

	tracing::info!("password changed");
	record_audit(
		&state,
		AuditEntry::new(AuditEventType::PasswordChanged)
			.actor(principal.id)
			.target(principal.id)
			.details(json!({ "email": principal.email })),
	)
	.await;

	Ok(Json(ApiResponse::ok(()).with_message("Password changed")))
}
