// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	extract::DefaultBodyLimit,
	middleware::from_fn_with_state,
	routing::{get, patch, post},
	Router,
};
use sqlx::sqlite::SqlitePool;
use stage_server_auth::{BootstrapGate, JwtService};
use stage_server_blob::BlobStore;
use stage_server_config::ServerConfig;
use stage_server_db::{
	AuditRepository, AuditStore, DocumentRepository, DocumentStore, EvaluationRepository,
	EvaluationStore, InternshipRepository, InternshipStore, LinkRepository, LinkStore,
	RequestRepository, RequestStore, SessionRepository, SessionStore, UserRepository, UserStore,
};
use stage_workflow_core::{InternshipDefaults, LeastLoaded, TutorAssignmentStrategy};

use crate::{auth_middleware::auth_layer, error::ServerError, routes};

/// Room for multipart framing and the small text fields sent with an upload.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub user_repo: Arc<dyn UserStore>,
	pub session_repo: Arc<dyn SessionStore>,
	pub internship_repo: Arc<dyn InternshipStore>,
	pub request_repo: Arc<dyn RequestStore>,
	pub document_repo: Arc<dyn DocumentStore>,
	pub link_repo: Arc<dyn LinkStore>,
	pub evaluation_repo: Arc<dyn EvaluationStore>,
	pub audit_repo: Arc<dyn AuditStore>,
	pub blob_store: Arc<dyn BlobStore>,
	pub jwt: Arc<JwtService>,
	pub jwt_ttl: chrono::Duration,
	pub session_ttl: chrono::Duration,
	pub cookie_secure: bool,
	pub bootstrap_gate: BootstrapGate,
	pub tutor_strategy: Arc<dyn TutorAssignmentStrategy>,
	pub internship_defaults: InternshipDefaults,
	pub max_upload_bytes: u64,
}

/// Build the state from a migrated pool, the loaded config and a blob store.
///
/// # Errors
/// `ServerError::Internal` if no signing secret is configured. `load_config`
/// always provides one outside production.
pub fn create_app_state(
	pool: SqlitePool,
	config: &ServerConfig,
	blob_store: Arc<dyn BlobStore>,
) -> Result<AppState, ServerError> {
	let auth = &config.auth;
	let secret = auth
		.jwt_secret
		.as_ref()
		.ok_or_else(|| ServerError::Internal("signing secret is not configured".to_string()))?;

	let jwt_ttl = chrono::Duration::minutes(to_i64(auth.jwt_ttl_minutes));
	let session_ttl = chrono::Duration::hours(to_i64(auth.session_ttl_hours));

	let bootstrap_gate = BootstrapGate::new(
		auth.bootstrap_enabled,
		auth.is_production(),
		auth.bootstrap_token.as_ref().map(|t| t.expose().to_string()),
	);

	let tutor_strategy: Arc<dyn TutorAssignmentStrategy> = Arc::new(LeastLoaded);
	tracing::info!(strategy = tutor_strategy.name(), "tutor assignment strategy");

	Ok(AppState {
		user_repo: Arc::new(UserRepository::new(pool.clone())),
		session_repo: Arc::new(SessionRepository::new(pool.clone())),
		internship_repo: Arc::new(InternshipRepository::new(pool.clone())),
		request_repo: Arc::new(RequestRepository::new(pool.clone())),
		document_repo: Arc::new(DocumentRepository::new(pool.clone())),
		link_repo: Arc::new(LinkRepository::new(pool.clone())),
		evaluation_repo: Arc::new(EvaluationRepository::new(pool.clone())),
		audit_repo: Arc::new(AuditRepository::new(pool.clone())),
		pool,
		blob_store,
		jwt: Arc::new(JwtService::new(
			secret.expose().as_bytes(),
			auth.jwt_issuer.clone(),
			jwt_ttl,
		)),
		jwt_ttl,
		session_ttl,
		cookie_secure: auth.cookie_secure,
		bootstrap_gate,
		tutor_strategy,
		internship_defaults: InternshipDefaults {
			company_name: config.internships.default_company.clone(),
			position: config.internships.default_position.clone(),
			duration_days: config.internships.duration_days,
		},
		max_upload_bytes: config.storage.max_upload_bytes,
	})
}

fn to_i64(value: u64) -> i64 {
	i64::try_from(value).unwrap_or(i64::MAX / 1_000_000)
}

/// All routes live under `/api`. The bootstrap route is only mounted while the
/// gate is open, so a closed gate answers 404.
pub fn create_router(state: AppState) -> Router {
	let upload_limit = usize::try_from(state.max_upload_bytes)
		.unwrap_or(usize::MAX)
		.saturating_add(UPLOAD_OVERHEAD_BYTES);

	let mut api = Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/openapi.json", get(crate::api_docs::openapi_json))
		// Auth
		.route("/auth/login", post(routes::auth::login))
		.route("/auth/logout", post(routes::auth::logout))
		.route("/auth/me", get(routes::auth::me).patch(routes::auth::update_me))
		.route("/auth/password", post(routes::auth::change_password))
		// Internships
		.route("/internships", get(routes::internships::list_internships))
		.route("/internships/{id}", get(routes::internships::get_internship))
		// Requests
		.route(
			"/requests",
			get(routes::requests::list_requests).post(routes::requests::create_request),
		)
		.route(
			"/requests/{id}",
			get(routes::requests::get_request).put(routes::requests::update_request),
		)
		.route(
			"/requests/{id}/documents",
			get(routes::requests::list_request_documents)
				.post(routes::requests::attach_request_documents),
		)
		// Documents
		.route(
			"/documents",
			get(routes::documents::list_documents)
				.post(routes::documents::upload_document)
				.layer(DefaultBodyLimit::max(upload_limit)),
		)
		.route(
			"/documents/{id}/download",
			get(routes::documents::download_document),
		)
		// Evaluations
		.route(
			"/evaluations",
			get(routes::evaluations::list_evaluations).post(routes::evaluations::create_evaluation),
		)
		.route("/evaluations/stats", get(routes::evaluations::evaluation_stats))
		.route(
			"/evaluations/{id}",
			get(routes::evaluations::get_evaluation)
				.put(routes::evaluations::update_evaluation)
				.delete(routes::evaluations::delete_evaluation),
		)
		// Admin
		.route(
			"/admin/users",
			get(routes::admin::list_users).post(routes::admin::create_user),
		)
		.route("/admin/users/{id}", patch(routes::admin::update_user));

	if state.bootstrap_gate.is_open() {
		tracing::warn!("bootstrap admin provisioning is enabled");
		api = api.route("/bootstrap/admin", post(routes::bootstrap::bootstrap_admin));
	}

	Router::new()
		.nest("/api", api)
		.layer(from_fn_with_state(state.clone(), auth_layer))
		.with_state(state)
}
