// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Intern request handlers.
//!
//! # Authorization Matrix
//!
//! | Endpoint                   | Allowed                                        |
//! |----------------------------|------------------------------------------------|
//! | `list_requests`            | any active principal, rows filtered by policy  |
//! | `create_request`           | intern, on their own internship                |
//! | `get_request`              | admin, rh, assigned tutor, owning intern       |
//! | `update_request` (status)  | admin, rh                                      |
//! | `update_request` (comment) | admin, rh, assigned tutor                      |
//! | `list_request_documents`   | same as `get_request`                          |
//! | `attach_request_documents` | owning intern                                  |

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use chrono::Utc;
use serde_json::json;
use stage_server_api::{
	ApiResponse, AttachDocumentsRequest, CreateRequestRequest, DocumentResponse, ErrorResponse,
	RequestDocumentLinkResponse, RequestResponse, UpdateRequestRequest,
};
use stage_server_auth::{
	can_access, Action, AuditEventType, DocumentId, InternshipId, LinkId, Principal, RequestId,
	ResourceAttrs,
};
use stage_server_db::{AuditEntry, ListScope};
use stage_workflow_core::{
	merge_request_documents, request::normalize_comment, FieldErrors, InternRequest,
	RequestDocumentLink, RequestStatus, RequestType, WorkflowError,
};

use super::{authorize, record_audit};
use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	validation::{parse_enum, parse_id},
};

async fn load_request(state: &AppState, id: &str) -> Result<InternRequest, ServerError> {
	let id: RequestId = parse_id(id, "id")?;
	state
		.request_repo
		.get_request(&id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("request {id}")))
}

/// GET /api/requests - Requests visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/requests",
    responses(
        (status = 200, description = "Visible requests", body = [RequestResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Account inactive", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn list_requests(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	let requests = state
		.request_repo
		.list_requests(ListScope::for_principal(principal))
		.await?;

	let visible: Vec<RequestResponse> = requests
		.iter()
		.filter(|r| can_access(principal, Action::Read, &r.attrs()))
		.map(RequestResponse::from)
		.collect();

	tracing::debug!(count = visible.len(), "listed requests");
	Ok(Json(ApiResponse::list(visible)))
}

/// POST /api/requests - Submit a request on the caller's internship.
///
/// Without `internship_id` the caller's current internship is used.
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateRequestRequest,
    responses(
        (status = 201, description = "Request created", body = RequestResponse),
        (status = 400, description = "Invalid payload or no internship", body = ErrorResponse),
        (status = 403, description = "Only the owning intern may submit", body = ErrorResponse),
        (status = 404, description = "Internship not found", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[tracing::instrument(skip(state, current_user, body), fields(actor_id = %current_user.principal.id))]
pub async fn create_request(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(body): Json<CreateRequestRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;

	// Only an intern can own an internship; refuse everyone else before lookups.
	authorize(principal, Action::Create, &ResourceAttrs::request(principal.id, None))?;

	let request_type: RequestType = parse_enum(&body.request_type, "type")?;

	let internship = match body.internship_id.as_deref() {
		Some(raw) => {
			let id: InternshipId = parse_id(raw, "internship_id")?;
			state
				.internship_repo
				.get_internship(&id)
				.await?
				.ok_or_else(|| ServerError::NotFound(format!("internship {id}")))?
		}
		None => state
			.internship_repo
			.get_current_internship_for_user(&principal.id)
			.await?
			.ok_or_else(|| ServerError::field("internship_id", "no internship found for this user"))?,
	};

	authorize(
		principal,
		Action::Create,
		&ResourceAttrs::request(internship.user_id, internship.tutor_id),
	)?;

	let request = InternRequest::new(
		request_type,
		internship.id,
		internship.user_id,
		internship.tutor_id,
		body.description,
		Utc::now(),
	)?;
	state.request_repo.create_request(&request).await?;

	tracing::info!(request_id = %request.id, request_type = %request.request_type, "request submitted");

	Ok((
		StatusCode::CREATED,
		Json(ApiResponse::ok(RequestResponse::from(&request)).with_message("Request created")),
	))
}

/// GET /api/requests/{id}
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "The request", body = RequestResponse),
        (status = 403, description = "Not allowed to read this request", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn get_request(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let request = load_request(&state, &id).await?;
	authorize(&current_user.principal, Action::Read, &request.attrs())?;
	Ok(Json(ApiResponse::ok(RequestResponse::from(&request))))
}

/// PUT /api/requests/{id} - Decide a request or annotate it.
///
/// With `status`, the request moves `pending → approved | rejected` (staff
/// only) and the optional comment is recorded with the decision. Without
/// `status`, `response_comment` replaces the comment and the status is left
/// alone (staff or the assigned tutor).
#[utoipa::path(
    put,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    request_body = UpdateRequestRequest,
    responses(
        (status = 200, description = "Updated request", body = RequestResponse),
        (status = 400, description = "Invalid transition or payload", body = ErrorResponse),
        (status = 403, description = "Not allowed", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[tracing::instrument(skip(state, current_user, body), fields(actor_id = %current_user.principal.id))]
pub async fn update_request(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(body): Json<UpdateRequestRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	let request = load_request(&state, &id).await?;
	let attrs = request.attrs();

	let status = body
		.status
		.as_deref()
		.map(str::trim)
		.filter(|s| !s.is_empty());

	match status {
		Some(status) => {
			authorize(principal, Action::WriteStatus, &attrs)?;
			let target: RequestStatus = parse_enum(status, "status")?;
			decide(&state, principal, &request, target, body.response_comment.as_deref()).await?;
		}
		None => {
			authorize(principal, Action::Comment, &attrs)?;
			let comment = normalize_comment(body.response_comment.as_deref())?.ok_or_else(|| {
				ServerError::field("response_comment", "status or response_comment is required")
			})?;
			if !state
				.request_repo
				.set_response_comment(&request.id, &comment)
				.await?
			{
				return Err(ServerError::NotFound(format!("request {}", request.id)));
			}
			tracing::info!(request_id = %request.id, "request comment updated");
		}
	}

	let updated = state
		.request_repo
		.get_request(&request.id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("request {}", request.id)))?;

	Ok(Json(ApiResponse::ok(RequestResponse::from(&updated)).with_message("Request updated")))
}

async fn decide(
	state: &AppState,
	principal: &Principal,
	request: &InternRequest,
	target: RequestStatus,
	comment: Option<&str>,
) -> Result<(), ServerError> {
	let decision = request.decide(target, comment, Utc::now())?;

	if !state.request_repo.apply_decision(&request.id, &decision).await? {
		// Someone else decided between our read and our write.
		let current = state
			.request_repo
			.get_request(&request.id)
			.await?
			.ok_or_else(|| ServerError::NotFound(format!("request {}", request.id)))?;
		tracing::warn!(request_id = %request.id, current = %current.status, "concurrent decision lost");
		return Err(WorkflowError::InvalidTransition {
			from: current.status,
			to: target,
		}
		.into());
	}

	record_audit(
		state,
		AuditEntry::new(AuditEventType::RequestDecided)
			.actor(principal.id)
			.target(request.id)
			.details(json!({ "from": decision.from.as_str(), "to": decision.status.as_str() })),
	)
	.await;

	Ok(())
}

/// GET /api/requests/{id}/documents - Documents tagged with or linked to the
/// request, newest first, with checklist annotations where linked.
#[utoipa::path(
    get,
    path = "/api/requests/{id}/documents",
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Merged document listing", body = [DocumentResponse]),
        (status = 403, description = "Not allowed to read this request", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn list_request_documents(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let request = load_request(&state, &id).await?;
	authorize(&current_user.principal, Action::ListDocuments, &request.attrs())?;

	let direct = state
		.document_repo
		.list_documents_for_request(&request.id)
		.await?;
	let linked = state.link_repo.list_linked_documents(&request.id).await?;
	let merged = merge_request_documents(direct, linked);

	let documents: Vec<DocumentResponse> = merged.iter().map(DocumentResponse::from).collect();
	Ok(Json(ApiResponse::list(documents)))
}

/// POST /api/requests/{id}/documents - Declare the required-document checklist.
///
/// Every entry needs a `type`. A referenced document must exist and be
/// readable by the caller. All rows are inserted or none.
#[utoipa::path(
    post,
    path = "/api/requests/{id}/documents",
    params(("id" = String, Path, description = "Request ID")),
    request_body = AttachDocumentsRequest,
    responses(
        (status = 201, description = "Checklist rows created", body = [RequestDocumentLinkResponse]),
        (status = 400, description = "Invalid entries", body = ErrorResponse),
        (status = 403, description = "Only the owning intern may attach", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[tracing::instrument(skip(state, current_user, body), fields(actor_id = %current_user.principal.id, count = body.documents.len()))]
pub async fn attach_request_documents(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(body): Json<AttachDocumentsRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	let request = load_request(&state, &id).await?;
	authorize(principal, Action::AttachDocuments, &request.attrs())?;

	if body.documents.is_empty() {
		return Err(ServerError::field("documents", "must not be empty"));
	}

	let now = Utc::now();
	let mut errors = FieldErrors::new();
	let mut links = Vec::with_capacity(body.documents.len());

	for (index, entry) in body.documents.iter().enumerate() {
		let document_type = entry
			.document_type
			.as_deref()
			.map(str::trim)
			.unwrap_or_default();
		if document_type.is_empty() {
			errors.add(format!("documents[{index}].type"), "is required");
			continue;
		}

		let document_id = match entry.document_id.as_deref().map(str::trim) {
			None | Some("") => None,
			Some(raw) => match raw.parse::<DocumentId>() {
				Ok(document_id) => Some(document_id),
				Err(_) => {
					errors.add(format!("documents[{index}].document_id"), "must be a valid id");
					continue;
				}
			},
		};

		if let Some(document_id) = document_id {
			match state.document_repo.get_document(&document_id).await? {
				Some(document) => authorize(principal, Action::Read, &document.attrs())?,
				None => {
					errors.add(format!("documents[{index}].document_id"), "document not found");
					continue;
				}
			}
		}

		links.push(RequestDocumentLink {
			id: LinkId::generate(),
			request_id: request.id,
			document_id,
			required_document_type: document_type.to_string(),
			mandatory: entry.mandatory.unwrap_or(false),
			created_at: now,
		});
	}

	if !errors.is_empty() {
		return Err(ServerError::validation(errors));
	}

	state.link_repo.create_links(&links).await?;
	tracing::info!(request_id = %request.id, count = links.len(), "request documents attached");

	let data: Vec<RequestDocumentLinkResponse> =
		links.iter().map(RequestDocumentLinkResponse::from).collect();
	Ok((
		StatusCode::CREATED,
		Json(ApiResponse::list(data).with_message("Documents attached")),
	))
}
