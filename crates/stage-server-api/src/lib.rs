// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types of the Stage HTTP API.
//!
//! Every JSON response is wrapped in an [`envelope`]: `{"success": true, "data": ..}`
//! on success and `{"success": false, "error": "<code>", "message": ..}` on failure.
//! Downloads are the only raw responses.

pub mod admin;
pub mod auth;
pub mod bootstrap;
pub mod documents;
pub mod envelope;
pub mod evaluations;
pub mod health;
pub mod requests;

pub use admin::{CreateUserRequest, CreateUserResponse, InternshipResponse, UpdateUserRequest};
pub use auth::{
	ChangePasswordRequest, LoginRequest, LoginResponse, UpdateProfileRequest, UserResponse,
};
pub use bootstrap::{BootstrapAdminRequest, BootstrapAdminResponse};
pub use documents::{DocumentResponse, UploadDocumentResponse};
pub use envelope::{ApiResponse, ErrorResponse};
pub use evaluations::{
	CreateEvaluationRequest, EvaluationResponse, EvaluationStatsResponse, UpdateEvaluationRequest,
};
pub use health::HealthResponse;
pub use requests::{
	AttachDocumentsRequest, CreateRequestRequest, RequestDocumentLinkResponse, RequestResponse,
	RequiredDocumentEntry, UpdateRequestRequest,
};
