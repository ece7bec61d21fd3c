// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bootstrap admin provisioning.
//!
//! Mounted only while the bootstrap gate is open (enabled, outside production,
//! with a configured token). Authenticated by the `X-Bootstrap-Token` header,
//! never by a session. Every attempt is audited.

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde_json::json;
use stage_server_api::{
	ApiResponse, BootstrapAdminRequest, BootstrapAdminResponse, ErrorResponse, UserResponse,
};
use stage_server_auth::{hash_password, AuditEventType, BOOTSTRAP_TOKEN_HEADER};
use stage_server_db::AuditEntry;

use super::record_audit;
use crate::{
	api::AppState,
	error::ServerError,
	validation::{check_account, sanitize_email},
};

/// POST /api/bootstrap/admin - Create or promote an active admin.
///
/// The password may be omitted only when promoting an existing account.
#[utoipa::path(
    post,
    path = "/api/bootstrap/admin",
    request_body = BootstrapAdminRequest,
    params(("X-Bootstrap-Token" = String, Header, description = "Configured bootstrap token")),
    responses(
        (status = 200, description = "Admin provisioned", body = BootstrapAdminResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Missing or wrong token", body = ErrorResponse),
        (status = 404, description = "Bootstrap disabled")
    ),
    tag = "bootstrap"
)]
#[tracing::instrument(skip(state, headers, body))]
pub async fn bootstrap_admin(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<BootstrapAdminRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let presented = headers
		.get(BOOTSTRAP_TOKEN_HEADER)
		.and_then(|v| v.to_str().ok());
	let email = sanitize_email(&body.email);

	if let Err(e) = state.bootstrap_gate.authorize(presented) {
		tracing::warn!(email = %email, reason = e.code(), "bootstrap provisioning rejected");
		record_audit(
			&state,
			AuditEntry::new(AuditEventType::BootstrapAdminRejected)
				.target(&email)
				.details(json!({ "reason": e.code() })),
		)
		.await;
		return Err(e.into());
	}

	check_account(&email, &body.name, body.password.as_deref())
		.into_result()
		.map_err(ServerError::from)?;

	let created = state.user_repo.get_user_by_email(&email).await?.is_none();
	if created && body.password.is_none() {
		return Err(ServerError::field(
			"password",
			"Password is required when creating a new admin",
		));
	}

	let password_hash = body.password.as_deref().map(hash_password).transpose()?;
	let principal = state
		.user_repo
		.upsert_admin(&email, body.name.trim(), password_hash.as_deref())
		.await?;

	tracing::warn!(user_id = %principal.id, created, "bootstrap admin provisioned");
	record_audit(
		&state,
		AuditEntry::new(AuditEventType::BootstrapAdminProvisioned)
			.target(principal.id)
			.details(json!({ "email": principal.email, "created": created })),
	)
	.await;

	Ok(Json(
		ApiResponse::ok(BootstrapAdminResponse {
			user: UserResponse::from(&principal),
			created,
		})
		.with_message("Admin provisioned"),
	))
}
