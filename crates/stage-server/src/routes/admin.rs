// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin user management. Every handler requires the admin role.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use chrono::Utc;
use serde_json::json;
use stage_server_api::{
	ApiResponse, CreateUserRequest, CreateUserResponse, ErrorResponse, InternshipResponse,
	UpdateUserRequest, UserResponse,
};
use stage_server_auth::{hash_password, Action, AuditEventType, Principal, ResourceAttrs, Role, UserId};
use stage_server_db::{AuditEntry, DbError};

use super::{authorize, record_audit};
use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	provisioning::provision_internship,
	validation::{check_account, optional_text, parse_enum, parse_id, sanitize_email},
};

/// GET /api/admin/users - All users, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "admin"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn list_users(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	authorize(&current_user.principal, Action::ManageUsers, &ResourceAttrs::user(None))?;

	let users = state.user_repo.list_users().await?;
	let data: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
	Ok(Json(ApiResponse::list(data)))
}

/// POST /api/admin/users - Provision an account.
///
/// For interns an internship is then created on a best-effort basis; if that
/// fails the account stays and `internship` is null.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Invalid fields or duplicate email", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "admin"
)]
#[tracing::instrument(skip(state, current_user, body), fields(actor_id = %current_user.principal.id))]
pub async fn create_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let actor = &current_user.principal;
	authorize(actor, Action::ManageUsers, &ResourceAttrs::user(None))?;

	let email = sanitize_email(&body.email);
	let mut errors = check_account(&email, &body.name, Some(&body.password));
	let role = match body.role.trim().parse::<Role>() {
		Ok(role) => Some(role),
		Err(e) => {
			errors.add("role", e);
			None
		}
	};
	let Some(role) = role.filter(|_| errors.is_empty()) else {
		return Err(ServerError::validation(errors));
	};

	let password_hash = hash_password(&body.password)?;

	let mut principal = Principal::new(email, body.name.trim(), role);
	principal.is_active = body.is_active;
	principal.phone = optional_text(body.phone);
	principal.department = optional_text(body.department);
	principal.position = optional_text(body.position);
	principal.address = optional_text(body.address);

	match state
		.user_repo
		.create_user(&principal, Some(&password_hash))
		.await
	{
		Ok(()) => {}
		Err(DbError::Conflict(_)) => {
			return Err(ServerError::field("email", "an account with this email already exists"));
		}
		Err(e) => return Err(e.into()),
	}

	tracing::info!(user_id = %principal.id, role = %principal.role, "user provisioned");

	let internship = if principal.role == Role::Intern {
		provision_internship(
			state.internship_repo.as_ref(),
			state.tutor_strategy.as_ref(),
			&state.internship_defaults,
			&principal,
			Utc::now(),
		)
		.await
	} else {
		None
	};

	record_audit(
		&state,
		AuditEntry::new(AuditEventType::UserCreated)
			.actor(actor.id)
			.target(principal.id)
			.details(json!({
				"role": principal.role.as_str(),
				"internship_id": internship.as_ref().map(|i| i.id.to_string()),
			})),
	)
	.await;

	let response = CreateUserResponse {
		user: UserResponse::from(&principal),
		internship: internship.as_ref().map(InternshipResponse::from),
	};
	Ok((
		StatusCode::CREATED,
		Json(ApiResponse::ok(response).with_message("User created")),
	))
}

/// PATCH /api/admin/users/{id} - Change role and/or active flag.
///
/// An admin cannot demote or deactivate themselves.
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid role or empty update", body = ErrorResponse),
        (status = 403, description = "Admin only, or self demotion", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
#[tracing::instrument(skip(state, current_user, body), fields(actor_id = %current_user.principal.id, target_id = %id))]
pub async fn update_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let actor = &current_user.principal;
	let user_id: UserId = parse_id(&id, "id")?;
	authorize(actor, Action::ManageUsers, &ResourceAttrs::user(Some(user_id)))?;

	let role: Option<Role> = body
		.role
		.as_deref()
		.map(|r| parse_enum(r, "role"))
		.transpose()?;
	if role.is_none() && body.is_active.is_none() {
		return Err(ServerError::field("role", "role or is_active is required"));
	}

	let target = state
		.user_repo
		.get_user_by_id(&user_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("user {user_id}")))?;

	if target.id == actor.id {
		if role.is_some_and(|r| r != Role::Admin) {
			return Err(ServerError::Forbidden("admins cannot demote themselves".to_string()));
		}
		if body.is_active == Some(false) {
			return Err(ServerError::Forbidden("admins cannot deactivate themselves".to_string()));
		}
	}

	if let Some(role) = role.filter(|r| *r != target.role) {
		state.user_repo.update_role(&target.id, role).await?;
		tracing::info!(user_id = %target.id, from = %target.role, to = %role, "role changed");
		record_audit(
			&state,
			AuditEntry::new(AuditEventType::RoleChanged)
				.actor(actor.id)
				.target(target.id)
				.details(json!({ "from": target.role.as_str(), "to": role.as_str() })),
		)
		.await;
	}

	if let Some(is_active) = body.is_active.filter(|a| *a != target.is_active) {
		state.user_repo.set_active(&target.id, is_active).await?;
		tracing::info!(user_id = %target.id, is_active, "active flag changed");
		record_audit(
			&state,
			AuditEntry::new(AuditEventType::ActiveChanged)
				.actor(actor.id)
				.target(target.id)
				.details(json!({ "is_active": is_active })),
		)
		.await;
	}

	let updated = state
		.user_repo
		.get_user_by_id(&target.id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("user {}", target.id)))?;

	Ok(Json(ApiResponse::ok(UserResponse::from(&updated)).with_message("User updated")))
}
