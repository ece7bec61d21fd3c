// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Liveness handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use stage_server_api::{ApiResponse, HealthResponse};

use crate::api::AppState;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Server and database are up", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /api/health - Liveness check. Needs no credentials.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let database_ok = match sqlx::query("SELECT 1").execute(&state.pool).await {
		Ok(_) => true,
		Err(e) => {
			tracing::error!(error = %e, "health check: database unreachable");
			false
		}
	};

	let (status, label) = if database_ok {
		(StatusCode::OK, "healthy")
	} else {
		(StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
	};

	let body = HealthResponse {
		status: label.to_string(),
		version: env!("CARGO_PKG_VERSION").to_string(),
		database: if database_ok { "ok" } else { "unavailable" }.to_string(),
	};

	(status, Json(ApiResponse::ok(body)))
}
