// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document upload, listing and download.

use axum::{
	extract::{Multipart, Path, State},
	http::{header, StatusCode},
	response::IntoResponse,
	Json,
};
use bytes::Bytes;
use chrono::Utc;
use stage_server_api::{ApiResponse, DocumentResponse, ErrorResponse, UploadDocumentResponse};
use stage_server_auth::{Action, DocumentId, RequestId, ResourceAttrs};
use stage_workflow_core::{filter_visible, sanitize_file_name, storage_path, Document};

use super::authorize;
use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError, validation::parse_id};

const DEFAULT_DOCUMENT_KIND: &str = "document";

/// GET /api/documents - The caller's own documents plus public ones. Staff see
/// everything. The query narrows the rows and the read policy decides each one.
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Visible documents", body = [DocumentResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "documents"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn list_documents(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	let documents = if principal.role.is_staff() {
		state.document_repo.list_all_documents().await?
	} else {
		state
			.document_repo
			.list_documents_visible_to(&principal.id)
			.await?
	};

	let data: Vec<DocumentResponse> = filter_visible(principal, documents)
		.iter()
		.map(DocumentResponse::from)
		.collect();
	Ok(Json(ApiResponse::list(data)))
}

#[derive(Default)]
struct UploadForm {
	file: Option<(String, Option<String>, Bytes)>,
	kind: Option<String>,
	request_id: Option<String>,
	is_public: bool,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ServerError> {
	let mut form = UploadForm::default();

	while let Some(field) = multipart.next_field().await.map_err(|e| {
		tracing::debug!(error = %e, "failed to read multipart field");
		ServerError::field("file", format!("invalid multipart data: {e}"))
	})? {
		let name = field.name().map(str::to_string);
		let unreadable = |e: axum::extract::multipart::MultipartError| {
			ServerError::field("file", format!("invalid multipart data: {e}"))
		};

		match name.as_deref() {
			Some("file") => {
				let file_name = field.file_name().unwrap_or("file").to_string();
				let mime = field.content_type().map(str::to_string);
				let data = field.bytes().await.map_err(unreadable)?;
				form.file = Some((file_name, mime, data));
			}
			Some("type") => {
				let text = field.text().await.map_err(unreadable)?;
				form.kind = Some(text.trim().to_string()).filter(|t| !t.is_empty());
			}
			Some("request_id") => {
				let text = field.text().await.map_err(unreadable)?;
				form.request_id = Some(text.trim().to_string()).filter(|t| !t.is_empty());
			}
			Some("is_public") => {
				form.is_public = field.text().await.map_err(unreadable)?.trim() == "true";
			}
			other => {
				tracing::debug!(field = ?other, "ignoring unknown multipart field");
			}
		}
	}

	Ok(form)
}

/// POST /api/documents - Upload a file (multipart).
///
/// Fields: `file` (required), `type` (default `document`), `request_id`,
/// `is_public` (`"true"` makes the document listable by everyone).
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(content_type = "multipart/form-data", description = "file, type, request_id, is_public"),
    responses(
        (status = 201, description = "Document stored", body = UploadDocumentResponse),
        (status = 400, description = "Missing file, too large, or bad request_id", body = ErrorResponse),
        (status = 403, description = "Request not readable by the uploader", body = ErrorResponse)
    ),
    tag = "documents"
)]
#[tracing::instrument(skip(state, current_user, multipart), fields(actor_id = %current_user.principal.id))]
pub async fn upload_document(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
	let principal = &current_user.principal;
	authorize(principal, Action::Create, &ResourceAttrs::document(principal.id, false))?;

	let form = read_form(multipart).await?;
	let Some((file_name, mime, data)) = form.file else {
		return Err(ServerError::field("file", "is required"));
	};

	let size = data.len() as u64;
	if size > state.max_upload_bytes {
		return Err(ServerError::field(
			"file",
			format!("must not exceed {} bytes", state.max_upload_bytes),
		));
	}

	let request_id = match form.request_id.as_deref() {
		Some(raw) => {
			let id: RequestId = parse_id(raw, "request_id")?;
			let request = state
				.request_repo
				.get_request(&id)
				.await?
				.ok_or_else(|| ServerError::field("request_id", "request not found"))?;
			authorize(principal, Action::Read, &request.attrs())?;
			Some(id)
		}
		None => None,
	};

	let now = Utc::now();
	let name = sanitize_file_name(&file_name);
	let key = storage_path(principal.id, now, &file_name);

	state.blob_store.put(&key, data).await?;

	let document = Document {
		id: DocumentId::generate(),
		name,
		kind: form
			.kind
			.unwrap_or_else(|| DEFAULT_DOCUMENT_KIND.to_string()),
		mime_type: mime.filter(|m| !m.is_empty()),
		size_bytes: i64::try_from(size).unwrap_or(i64::MAX),
		storage_path: key.clone(),
		owner_id: principal.id,
		request_id,
		is_public: form.is_public,
		created_at: now,
	};

	if let Err(e) = state.document_repo.create_document(&document).await {
		tracing::warn!(error = %e, storage_path = %key, "metadata insert failed; removing blob");
		if let Err(remove_err) = state.blob_store.remove(&key).await {
			tracing::error!(error = %remove_err, storage_path = %key, "failed to remove orphaned blob");
		}
		return Err(e.into());
	}

	tracing::info!(document_id = %document.id, size_bytes = document.size_bytes, "document uploaded");

	Ok((
		StatusCode::CREATED,
		Json(
			ApiResponse::ok(UploadDocumentResponse {
				document: DocumentResponse::from(&document),
				storage_path: key,
			})
			.with_message("Document uploaded"),
		),
	))
}

/// GET /api/documents/{id}/download - Raw file bytes.
#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Not allowed to download", body = ErrorResponse),
        (status = 404, description = "Document or blob not found", body = ErrorResponse)
    ),
    tag = "documents"
)]
#[tracing::instrument(skip(state, current_user), fields(actor_id = %current_user.principal.id))]
pub async fn download_document(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let id: DocumentId = parse_id(&id, "id")?;
	let document = state
		.document_repo
		.get_document(&id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("document {id}")))?;

	authorize(&current_user.principal, Action::Download, &document.attrs())?;

	let data = state.blob_store.get(&document.storage_path).await?;

	Ok((
		[
			(header::CONTENT_TYPE, document.content_type().to_string()),
			(
				header::CONTENT_DISPOSITION,
				format!("attachment; filename=\"{}\"", sanitize_file_name(&document.name)),
			),
			(header::CONTENT_LENGTH, data.len().to_string()),
		],
		data,
	))
}
