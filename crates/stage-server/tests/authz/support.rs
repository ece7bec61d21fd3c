// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared harness for the HTTP authorization tests: a migrated SQLite database
//! in a temp dir, an in-memory blob store and one user per role.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
	body::Body,
	http::{header::HeaderName, header::HeaderValue, Method, Request, Response, StatusCode},
	Router,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use stage_server::{create_app_state, create_router, AppState, ServerConfig};
use stage_server_auth::{generate_session_token, hash_password, hash_token, Principal, Role, Session};
use stage_server_blob::MemoryBlobStore;
use stage_workflow_core::{Internship, InternshipDefaults};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse";
pub const BOOTSTRAP_TOKEN: &str = "bootstrap-test-token";

#[derive(Clone)]
pub struct TestUser {
	pub principal: Principal,
	pub session_token: String,
}

impl TestUser {
	pub fn auth_header(&self) -> (HeaderName, HeaderValue) {
		(
			HeaderName::from_static("cookie"),
			HeaderValue::from_str(&format!("stage_session={}", self.session_token)).unwrap(),
		)
	}

	pub fn id(&self) -> String {
		self.principal.id.to_string()
	}
}

#[derive(Clone)]
pub struct InternFixture {
	pub user: TestUser,
	pub internship: Internship,
}

#[derive(Clone)]
pub struct Fixtures {
	pub admin: TestUser,
	pub rh: TestUser,
	/// Supervises `intern_a`.
	pub tutor: TestUser,
	/// Supervises `intern_b`.
	pub other_tutor: TestUser,
	pub intern_a: InternFixture,
	pub intern_b: InternFixture,
	/// An admin whose account was deactivated.
	pub inactive: TestUser,
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	_temp_dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		Self::new_internal(false).await
	}

	/// Same fixtures, with the bootstrap route mounted.
	pub async fn with_bootstrap() -> Self {
		Self::new_internal(true).await
	}

	async fn new_internal(bootstrap: bool) -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = stage_server_db::create_pool(&db_url, 4).await.unwrap();
		stage_server_db::run_migrations(&pool).await.unwrap();

		let mut config = ServerConfig::default();
		config.auth.environment = "test".to_string();
		config.auth.jwt_secret = Some("test-signing-secret-with-enough-bytes".into());
		config.storage.max_upload_bytes = 1024;
		if bootstrap {
			config.auth.bootstrap_enabled = true;
			config.auth.bootstrap_token = Some(BOOTSTRAP_TOKEN.into());
		}

		let state = create_app_state(pool, &config, Arc::new(MemoryBlobStore::new())).unwrap();
		let fixtures = create_fixtures(&state).await;
		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PUT, path, user, Some(body)).await
	}

	pub async fn patch(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PATCH, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	/// POST with a custom header and no session (bootstrap token, bearer).
	pub async fn post_with_header(
		&self,
		path: &str,
		header_name: &str,
		header_value: &str,
		body: impl Serialize,
	) -> Response<Body> {
		let request = Request::builder()
			.method(Method::POST)
			.uri(path)
			.header("content-type", "application/json")
			.header(header_name, header_value)
			.body(Body::from(serde_json::to_string(&body).unwrap()))
			.unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}

	/// GET with a single custom header and no session.
	pub async fn get_with_header(&self, path: &str, header_name: &str, header_value: &str) -> Response<Body> {
		let request = Request::builder()
			.method(Method::GET)
			.uri(path)
			.header(header_name, header_value)
			.body(Body::empty())
			.unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}

	/// Multipart upload to `/api/documents`. `fields` are plain text parts;
	/// `file` is `(file name, bytes)`.
	pub async fn upload(
		&self,
		user: Option<&TestUser>,
		file: Option<(&str, &[u8])>,
		fields: &[(&str, &str)],
	) -> Response<Body> {
		const BOUNDARY: &str = "stage-test-boundary";
		let mut body: Vec<u8> = Vec::new();
		for (name, value) in fields {
			body.extend_from_slice(
				format!(
					"--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
				)
				.as_bytes(),
			);
		}
		if let Some((file_name, data)) = file {
			body.extend_from_slice(
				format!(
					"--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
				)
				.as_bytes(),
			);
			body.extend_from_slice(data);
			body.extend_from_slice(b"\r\n");
		}
		body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

		let mut builder = Request::builder()
			.method(Method::POST)
			.uri("/api/documents")
			.header(
				"content-type",
				format!("multipart/form-data; boundary={BOUNDARY}"),
			);
		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}

		let request = builder.body(Body::from(body)).unwrap();
		self.router.clone().oneshot(request).await.unwrap()
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&body).unwrap()
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<serde_json::Value>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PUT => {
				app.put(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PATCH => {
				app
					.patch(&case.path, case.user.as_ref(), body.clone())
					.await
			}
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}

/// Create a user with [`TEST_PASSWORD`] and a live session.
pub async fn create_test_user(state: &AppState, email: &str, name: &str, role: Role) -> TestUser {
	let principal = Principal::new(email, name, role);
	let password_hash = hash_password(TEST_PASSWORD).unwrap();
	state
		.user_repo
		.create_user(&principal, Some(&password_hash))
		.await
		.unwrap();

	let session_token = generate_session_token();
	let session = Session::new(principal.id, Duration::hours(1));
	state
		.session_repo
		.create_session(&session, &hash_token(&session_token))
		.await
		.unwrap();

	TestUser {
		principal,
		session_token,
	}
}

async fn create_intern(state: &AppState, email: &str, tutor: &TestUser) -> InternFixture {
	let user = create_test_user(state, email, "Intern User", Role::Intern).await;
	let defaults = InternshipDefaults {
		company_name: "Acme".to_string(),
		position: "Intern".to_string(),
		duration_days: 90,
	};
	let internship = defaults.build(user.principal.id, Some(tutor.principal.id), Utc::now());
	state
		.internship_repo
		.create_internship(&internship)
		.await
		.unwrap();

	InternFixture { user, internship }
}

async fn create_fixtures(state: &AppState) -> Fixtures {
	let admin = create_test_user(state, "admin@test.com", "Admin User", Role::Admin).await;
	let rh = create_test_user(state, "rh@test.com", "Human Resources", Role::Rh).await;
	let tutor = create_test_user(state, "tutor@test.com", "Tutor User", Role::Tutor).await;
	let other_tutor = create_test_user(state, "tutor-b@test.com", "Other Tutor", Role::Tutor).await;
	let intern_a = create_intern(state, "intern-a@test.com", &tutor).await;
	let intern_b = create_intern(state, "intern-b@test.com", &other_tutor).await;

	let mut inactive = create_test_user(state, "inactive@test.com", "Inactive Admin", Role::Admin).await;
	state
		.user_repo
		.set_active(&inactive.principal.id, false)
		.await
		.unwrap();
	inactive.principal.is_active = false;

	Fixtures {
		admin,
		rh,
		tutor,
		other_tutor,
		intern_a,
		intern_b,
		inactive,
	}
}

/// Submit a request as `intern` and return its id.
pub async fn create_request(app: &TestApp, intern: &TestUser, request_type: &str) -> String {
	let response = app
		.post(
			"/api/requests",
			Some(intern),
			serde_json::json!({ "type": request_type, "description": "Need a change" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	body["data"]["id"].as_str().unwrap().to_string()
}

/// Create an evaluation of `intern` by `tutor` and return its id.
pub async fn create_evaluation(
	app: &TestApp,
	tutor: &TestUser,
	intern: &InternFixture,
	status: &str,
) -> String {
	let response = app
		.post(
			"/api/evaluations",
			Some(tutor),
			serde_json::json!({
				"internship_id": intern.internship.id.to_string(),
				"type": "mid_term",
				"period_start": "2025-01-01",
				"period_end": "2025-03-31",
				"technical": 14,
				"interpersonal": 12,
				"autonomy": 16,
				"punctuality": 18,
				"motivation": 10,
				"status": status,
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	body["data"]["id"].as_str().unwrap().to_string()
}
