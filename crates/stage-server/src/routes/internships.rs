// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internship reads. Internships are created by provisioning only.
//!
//! | Endpoint           | Allowed                                          |
//! |--------------------|--------------------------------------------------|
//! | `list_internships` | any active principal, rows filtered by policy    |
//! | `get_internship`   | admin, rh, supervising tutor, owning intern      |

use axum::{
	extract::{Path, State},
	response::IntoResponse,
	Json,
};
use stage_server_api::{ApiResponse, ErrorResponse, InternshipResponse};
use stage_server_auth::{can_access, Action, InternshipId};
use stage_server_db::ListScope;

use super::authorize;
use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError, validation::parse_id};

/// GET /api/internships - Internships visible to the caller, newest first.
///
/// Staff see every internship, tutors the ones they supervise, interns their own.
#[utoipa::path(
    get,
    path = "/api/internships",
    responses(
        (status = 200, description = "Visible internships", body = [InternshipResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Account inactive", body = ErrorResponse)
    ),
    tag = "internships"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn list_internships(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	let internships = state
		.internship_repo
		.list_internships(ListScope::for_principal(principal))
		.await?;

	let data: Vec<InternshipResponse> = internships
		.iter()
		.filter(|i| can_access(principal, Action::Read, &i.attrs()))
		.map(InternshipResponse::from)
		.collect();

	tracing::debug!(count = data.len(), "listed internships");
	Ok(Json(ApiResponse::list(data)))
}

/// GET /api/internships/{id}
#[utoipa::path(
    get,
    path = "/api/internships/{id}",
    params(("id" = String, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "The internship", body = InternshipResponse),
        (status = 403, description = "Not allowed to read", body = ErrorResponse),
        (status = 404, description = "Internship not found", body = ErrorResponse)
    ),
    tag = "internships"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn get_internship(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let id: InternshipId = parse_id(&id, "id")?;
	let internship = state
		.internship_repo
		.get_internship(&id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("internship {id}")))?;

	authorize(&current_user.principal, Action::Read, &internship.attrs())?;
	Ok(Json(ApiResponse::ok(InternshipResponse::from(&internship))))
}
