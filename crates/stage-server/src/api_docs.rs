// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for stage-server, generated from the handler
//! annotations with utoipa and served at `/api/openapi.json`.

use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stage Server API",
        version = "1.0.0",
        description = "Internship management: requests, documents, evaluations and user provisioning.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Liveness and database status"),
        (name = "auth", description = "Login, logout and the caller's own account"),
        (name = "internships", description = "Internship placements"),
        (name = "requests", description = "Intern requests and their required documents"),
        (name = "documents", description = "Document upload, listing and download"),
        (name = "evaluations", description = "Intern evaluations and statistics"),
        (name = "admin", description = "User provisioning and role management"),
        (name = "bootstrap", description = "Token-gated first admin provisioning")
    ),
    paths(
        routes::health::health_check,
        routes::auth::login,
        routes::auth::logout,
        routes::auth::me,
        routes::auth::update_me,
        routes::auth::change_password,
        routes::internships::list_internships,
        routes::internships::get_internship,
        routes::requests::list_requests,
        routes::requests::create_request,
        routes::requests::get_request,
        routes::requests::update_request,
        routes::requests::list_request_documents,
        routes::requests::attach_request_documents,
        routes::documents::list_documents,
        routes::documents::upload_document,
        routes::documents::download_document,
        routes::evaluations::list_evaluations,
        routes::evaluations::create_evaluation,
        routes::evaluations::get_evaluation,
        routes::evaluations::update_evaluation,
        routes::evaluations::delete_evaluation,
        routes::evaluations::evaluation_stats,
        routes::admin::list_users,
        routes::admin::create_user,
        routes::admin::update_user,
        routes::bootstrap::bootstrap_admin,
    ),
    components(
        schemas(
            stage_server_api::ErrorResponse,
            stage_server_api::HealthResponse,
            stage_server_api::LoginRequest,
            stage_server_api::LoginResponse,
            stage_server_api::UserResponse,
            stage_server_api::UpdateProfileRequest,
            stage_server_api::ChangePasswordRequest,
            stage_server_api::CreateRequestRequest,
            stage_server_api::UpdateRequestRequest,
            stage_server_api::RequiredDocumentEntry,
            stage_server_api::AttachDocumentsRequest,
            stage_server_api::RequestResponse,
            stage_server_api::RequestDocumentLinkResponse,
            stage_server_api::DocumentResponse,
            stage_server_api::UploadDocumentResponse,
            stage_server_api::CreateEvaluationRequest,
            stage_server_api::UpdateEvaluationRequest,
            stage_server_api::EvaluationResponse,
            stage_server_api::EvaluationStatsResponse,
            stage_server_api::CreateUserRequest,
            stage_server_api::UpdateUserRequest,
            stage_server_api::InternshipResponse,
            stage_server_api::CreateUserResponse,
            stage_server_api::BootstrapAdminRequest,
            stage_server_api::BootstrapAdminResponse,
        )
    )
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn openapi_json() -> impl IntoResponse {
	Json(ApiDoc::openapi())
}
