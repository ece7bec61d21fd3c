// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error type.
//!
//! Every handler returns `Result<_, ServerError>`. Client errors carry their code
//! and message to the caller; store and storage failures are logged with their
//! details and answered with a generic 500.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use stage_server_api::ErrorResponse;
use stage_server_auth::{AuthError, UserId};
use stage_server_blob::BlobError;
use stage_server_db::DbError;
use stage_workflow_core::{FieldErrors, WorkflowError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("authentication required")]
	Unauthenticated,

	#[error("profile not found for user {0}")]
	ProfileNotFound(UserId),

	#[error("forbidden: {0}")]
	Forbidden(String),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("bad request: {0}")]
	BadRequest(String),

	#[error(transparent)]
	Workflow(#[from] WorkflowError),

	#[error(transparent)]
	Db(#[from] DbError),

	#[error(transparent)]
	Blob(#[from] BlobError),

	#[error(transparent)]
	Auth(#[from] AuthError),

	#[error("internal error: {0}")]
	Internal(String),
}

impl ServerError {
	/// Single-field validation error.
	pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
		ServerError::Workflow(WorkflowError::field(field, message))
	}

	pub fn validation(errors: FieldErrors) -> Self {
		ServerError::Workflow(WorkflowError::Validation(errors))
	}

	pub fn status_code(&self) -> StatusCode {
		match self {
			ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
			ServerError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
			ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
			ServerError::NotFound(_) => StatusCode::NOT_FOUND,
			ServerError::BadRequest(_) | ServerError::Workflow(_) => StatusCode::BAD_REQUEST,
			ServerError::Db(DbError::NotFound(_)) => StatusCode::NOT_FOUND,
			ServerError::Db(DbError::Conflict(_)) => StatusCode::CONFLICT,
			ServerError::Blob(BlobError::NotFound(_)) => StatusCode::NOT_FOUND,
			ServerError::Auth(e) => {
				StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			}
			ServerError::Db(_) | ServerError::Blob(_) | ServerError::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	pub fn code(&self) -> &'static str {
		match self {
			ServerError::Unauthenticated => "unauthenticated",
			ServerError::ProfileNotFound(_) => "profile_not_found",
			ServerError::Forbidden(_) => "forbidden",
			ServerError::NotFound(_)
			| ServerError::Db(DbError::NotFound(_))
			| ServerError::Blob(BlobError::NotFound(_)) => "not_found",
			ServerError::BadRequest(_) => "validation_error",
			ServerError::Workflow(e) => e.code(),
			ServerError::Db(DbError::Conflict(_)) => "conflict",
			ServerError::Auth(e) => e.code(),
			ServerError::Db(_) => "store_error",
			ServerError::Blob(_) => "storage_error",
			ServerError::Internal(_) => "internal_error",
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		let code = self.code();

		let body = if status.is_server_error() {
			tracing::error!(error = %self, code, "request failed");
			ErrorResponse::new(code, "An internal error occurred")
		} else {
			match self {
				ServerError::Workflow(WorkflowError::Validation(errors)) => {
					let message = errors.to_string();
					ErrorResponse::new(code, message).with_fields(errors.into_inner())
				}
				ServerError::Auth(e) => ErrorResponse::new(code, auth_message(&e)),
				other => ErrorResponse::new(code, other.to_string()),
			}
		};

		(status, Json(body)).into_response()
	}
}

/// Client-facing text for auth failures. Credential problems all read the same
/// so the response does not reveal which part was wrong.
fn auth_message(err: &AuthError) -> String {
	match err {
		AuthError::AuthenticationRequired
		| AuthError::SessionNotFound
		| AuthError::SessionExpired
		| AuthError::InvalidAccessToken
		| AuthError::AccessTokenExpired => "Authentication required".to_string(),
		AuthError::InvalidCredentials => "Invalid credentials".to_string(),
		other => other.to_string(),
	}
}
