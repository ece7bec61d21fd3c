// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity resolution, login and logout.

use axum::http::{header, StatusCode};
use chrono::Duration;
use serde_json::json;
use stage_server_auth::{
	generate_session_token, hash_token, AuditEventType, Principal, Role, Session, UserId,
};

use super::support::{json_body, TestApp, TEST_PASSWORD};

async fn login_token(app: &TestApp, email: &str, password: &str) -> String {
	let response = app
		.post("/api/auth/login", None, json!({ "email": email, "password": password }))
		.await;
	assert_eq!(response.status(), StatusCode::OK, "login as {email}");
	json_body(response).await["data"]["token"]
		.as_str()
		.unwrap()
		.to_string()
}

fn bearer(token: &str) -> String {
	format!("Bearer {token}")
}

// ============================================================================
// Identity resolution
// ============================================================================

#[tokio::test]
async fn health_is_public() {
	let app = TestApp::new().await;

	let response = app.get("/api/health", None).await;

	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["success"], true);
	assert_eq!(body["data"]["status"], "healthy");
	assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_credential() {
	let app = TestApp::new().await;

	for path in ["/api/auth/me", "/api/requests", "/api/documents", "/api/evaluations"] {
		let response = app.get(path, None).await;
		assert_eq!(
			response.status(),
			StatusCode::UNAUTHORIZED,
			"GET {path} should require authentication"
		);
		let body = json_body(response).await;
		assert_eq!(body["success"], false);
		assert_eq!(body["error"], "unauthenticated");
	}
}

#[tokio::test]
async fn session_cookie_resolves_profile() {
	let app = TestApp::new().await;
	let tutor = &app.fixtures.tutor;

	let response = app.get("/api/auth/me", Some(tutor)).await;

	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["data"]["id"], tutor.id());
	assert_eq!(body["data"]["role"], "tutor");
}

#[tokio::test]
async fn opaque_session_token_works_as_bearer() {
	let app = TestApp::new().await;
	let rh = &app.fixtures.rh;

	let response = app
		.get_with_header(
			"/api/auth/me",
			"authorization",
			&format!("Bearer {}", rh.session_token),
		)
		.await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["data"]["email"], "rh@test.com");
}

#[tokio::test]
async fn signed_token_works_as_bearer() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin.principal;
	let token = app
		.state
		.jwt
		.issue(admin.id, &admin.email, Some(admin.role), None)
		.unwrap();

	let response = app
		.get_with_header("/api/auth/me", "authorization", &format!("Bearer {token}"))
		.await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["data"]["role"], "admin");
}

#[tokio::test]
async fn stored_role_wins_over_token_role_hint() {
	let app = TestApp::new().await;
	let intern = &app.fixtures.intern_a.user.principal;
	let token = app
		.state
		.jwt
		.issue(intern.id, &intern.email, Some(Role::Admin), None)
		.unwrap();

	let response = app
		.get_with_header("/api/admin/users", "authorization", &format!("Bearer {token}"))
		.await;

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_bearer_is_unauthenticated() {
	let app = TestApp::new().await;

	let unknown_session = generate_session_token();
	for token in ["garbage", "a.b.c", unknown_session.as_str()] {
		let response = app
			.get_with_header("/api/auth/me", "authorization", &format!("Bearer {token}"))
			.await;
		assert_eq!(
			response.status(),
			StatusCode::UNAUTHORIZED,
			"bearer {token:?} should not resolve"
		);
	}
}

#[tokio::test]
async fn valid_token_without_profile_is_profile_not_found() {
	let app = TestApp::new().await;
	let token = app
		.state
		.jwt
		.issue(UserId::generate(), "ghost@test.com", None, None)
		.unwrap();

	let response = app
		.get_with_header("/api/auth/me", "authorization", &format!("Bearer {token}"))
		.await;

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(json_body(response).await["error"], "profile_not_found");
}

#[tokio::test]
async fn expired_session_is_unauthenticated() {
	let app = TestApp::new().await;
	let user_id = app.fixtures.tutor.principal.id;
	let token = generate_session_token();
	let session = Session::new(user_id, Duration::minutes(-5));
	app.state
		.session_repo
		.create_session(&session, &hash_token(&token))
		.await
		.unwrap();

	let response = app
		.get_with_header("/api/auth/me", "cookie", &format!("stage_session={token}"))
		.await;

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_principal_can_see_itself_but_nothing_else() {
	let app = TestApp::new().await;
	let inactive = &app.fixtures.inactive;

	let me = app.get("/api/auth/me", Some(inactive)).await;
	assert_eq!(me.status(), StatusCode::OK);
	assert_eq!(json_body(me).await["data"]["is_active"], false);

	for path in ["/api/requests", "/api/documents", "/api/evaluations", "/api/admin/users"] {
		let response = app.get(path, Some(inactive)).await;
		assert_eq!(
			response.status(),
			StatusCode::FORBIDDEN,
			"inactive admin should be refused on {path}"
		);
	}
}

// ============================================================================
// Login / logout
// ============================================================================

#[tokio::test]
async fn login_sets_cookie_and_returns_bearer() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/api/auth/login",
			None,
			json!({ "email": "  Tutor@Test.com ", "password": TEST_PASSWORD }),
		)
		.await;

	assert_eq!(response.status(), StatusCode::OK);
	let cookie = response
		.headers()
		.get(header::SET_COOKIE)
		.and_then(|v| v.to_str().ok())
		.unwrap()
		.to_string();
	assert!(cookie.starts_with("stage_session="));
	assert!(cookie.contains("HttpOnly"));

	let body = json_body(response).await;
	assert_eq!(body["data"]["token_type"], "Bearer");
	assert_eq!(body["data"]["user"]["email"], "tutor@test.com");

	let token = body["data"]["token"].as_str().unwrap();
	let me = app
		.get_with_header("/api/auth/me", "authorization", &format!("Bearer {token}"))
		.await;
	assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_failures_are_uniform() {
	let app = TestApp::new().await;

	let wrong_password = app
		.post(
			"/api/auth/login",
			None,
			json!({ "email": "tutor@test.com", "password": "not-the-password" }),
		)
		.await;
	let unknown_email = app
		.post(
			"/api/auth/login",
			None,
			json!({ "email": "nobody@test.com", "password": TEST_PASSWORD }),
		)
		.await;

	assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(
		json_body(wrong_password).await["message"],
		json_body(unknown_email).await["message"]
	);
}

#[tokio::test]
async fn inactive_account_cannot_log_in() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/api/auth/login",
			None,
			json!({ "email": "inactive@test.com", "password": TEST_PASSWORD }),
		)
		.await;

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_ends_the_session() {
	let app = TestApp::new().await;
	let rh = &app.fixtures.rh;

	let response = app.post("/api/auth/logout", Some(rh), json!({})).await;
	assert_eq!(response.status(), StatusCode::OK);
	let cleared = response
		.headers()
		.get(header::SET_COOKIE)
		.and_then(|v| v.to_str().ok())
		.unwrap();
	assert!(cleared.contains("Max-Age=0"));

	let after = app.get("/api/auth/me", Some(rh)).await;
	assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_refuses_account_without_password_like_unknown_email() {
	let app = TestApp::new().await;
	let principal = Principal::new("nopass@test.com", "No Password", Role::Tutor);
	app.state.user_repo.create_user(&principal, None).await.unwrap();

	let no_password = app
		.post(
			"/api/auth/login",
			None,
			json!({ "email": "nopass@test.com", "password": TEST_PASSWORD }),
		)
		.await;
	let unknown_email = app
		.post(
			"/api/auth/login",
			None,
			json!({ "email": "ghost@test.com", "password": TEST_PASSWORD }),
		)
		.await;

	assert_eq!(no_password.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(
		json_body(no_password).await["error"],
		json_body(unknown_email).await["error"]
	);
}

#[tokio::test]
async fn logout_revokes_the_signed_token_from_login() {
	let app = TestApp::new().await;
	let token = login_token(&app, "tutor@test.com", TEST_PASSWORD).await;

	let before = app
		.get_with_header("/api/auth/me", "authorization", &bearer(&token))
		.await;
	assert_eq!(before.status(), StatusCode::OK);

	let logout = app
		.post_with_header("/api/auth/logout", "authorization", &bearer(&token), json!({}))
		.await;
	assert_eq!(logout.status(), StatusCode::OK);

	let after = app
		.get_with_header("/api/auth/me", "authorization", &bearer(&token))
		.await;
	assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_token_naming_an_expired_session_is_refused() {
	let app = TestApp::new().await;
	let tutor = &app.fixtures.tutor.principal;
	let session = Session::new(tutor.id, Duration::minutes(-5));
	app.state
		.session_repo
		.create_session(&session, &hash_token(&generate_session_token()))
		.await
		.unwrap();
	let token = app
		.state
		.jwt
		.issue(tutor.id, &tutor.email, None, Some(session.id))
		.unwrap();

	let response = app
		.get_with_header("/api/auth/me", "authorization", &bearer(&token))
		.await;

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_token_cannot_borrow_another_users_session() {
	let app = TestApp::new().await;
	let tutor = &app.fixtures.tutor.principal;
	let rh = &app.fixtures.rh.principal;
	let rh_session = Session::new(rh.id, Duration::hours(1));
	app.state
		.session_repo
		.create_session(&rh_session, &hash_token(&generate_session_token()))
		.await
		.unwrap();
	let token = app
		.state
		.jwt
		.issue(tutor.id, &tutor.email, None, Some(rh_session.id))
		.unwrap();

	let response = app
		.get_with_header("/api/auth/me", "authorization", &bearer(&token))
		.await;

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Self-service
// ============================================================================

#[tokio::test]
async fn profile_update_changes_contact_details_only() {
	let app = TestApp::new().await;
	let intern = &app.fixtures.intern_a.user;

	let response = app
		.patch(
			"/api/auth/me",
			Some(intern),
			json!({
				"name": "  Alice Martin ",
				"phone": " +33 6 12 34 56 78 ",
				"department": "Engineering",
				"role": "admin",
				"email": "hijack@test.com",
			}),
		)
		.await;

	assert_eq!(response.status(), StatusCode::OK);
	let data = &json_body(response).await["data"];
	assert_eq!(data["name"], "Alice Martin");
	assert_eq!(data["phone"], "+33 6 12 34 56 78");
	assert_eq!(data["department"], "Engineering");
	assert_eq!(data["role"], "intern");
	assert_eq!(data["email"], "intern-a@test.com");

	let cleared = app
		.patch("/api/auth/me", Some(intern), json!({ "department": "  " }))
		.await;
	assert_eq!(cleared.status(), StatusCode::OK);

	let stored = app
		.state
		.user_repo
		.get_user_by_id(&intern.principal.id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(stored.name, "Alice Martin");
	assert_eq!(stored.phone.as_deref(), Some("+33 6 12 34 56 78"));
	assert_eq!(stored.department, None);
	assert_eq!(stored.role, Role::Intern);
}

#[tokio::test]
async fn profile_update_validation() {
	let app = TestApp::new().await;
	let tutor = &app.fixtures.tutor;

	let empty = app.patch("/api/auth/me", Some(tutor), json!({})).await;
	assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

	let short_name = app.patch("/api/auth/me", Some(tutor), json!({ "name": " A " })).await;
	assert_eq!(short_name.status(), StatusCode::BAD_REQUEST);
	assert!(json_body(short_name).await["fields"]["name"].is_string());

	let inactive = app
		.patch("/api/auth/me", Some(&app.fixtures.inactive), json!({ "phone": "0102030405" }))
		.await;
	assert_eq!(inactive.status(), StatusCode::FORBIDDEN);

	let anonymous = app.patch("/api/auth/me", None, json!({ "phone": "0102030405" })).await;
	assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_change_requires_the_current_password() {
	let app = TestApp::new().await;
	let rh = &app.fixtures.rh;

	let wrong = app
		.post(
			"/api/auth/password",
			Some(rh),
			json!({ "current_password": "not-it", "new_password": "brand-new-pass" }),
		)
		.await;
	assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
	assert!(json_body(wrong).await["fields"]["current_password"].is_string());

	let weak = app
		.post(
			"/api/auth/password",
			Some(rh),
			json!({ "current_password": TEST_PASSWORD, "new_password": "123" }),
		)
		.await;
	assert_eq!(weak.status(), StatusCode::BAD_REQUEST);
	assert!(json_body(weak).await["fields"]["new_password"].is_string());

	let old_still_works = app
		.post("/api/auth/login", None, json!({ "email": "rh@test.com", "password": TEST_PASSWORD }))
		.await;
	assert_eq!(old_still_works.status(), StatusCode::OK);
}

#[tokio::test]
async fn password_change_replaces_the_login_password() {
	let app = TestApp::new().await;
	let rh = &app.fixtures.rh;

	let response = app
		.post(
			"/api/auth/password",
			Some(rh),
			json!({ "current_password": TEST_PASSWORD, "new_password": "brand-new-pass" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let old = app
		.post("/api/auth/login", None, json!({ "email": "rh@test.com", "password": TEST_PASSWORD }))
		.await;
	assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
	login_token(&app, "rh@test.com", "brand-new-pass").await;

	let still_signed_in = app.get("/api/auth/me", Some(rh)).await;
	assert_eq!(still_signed_in.status(), StatusCode::OK);

	let entries = app.state.audit_repo.list_recent(10).await.unwrap();
	let changed = entries
		.iter()
		.find(|e| e.event_type == AuditEventType::PasswordChanged)
		.expect("password change audited");
	assert_eq!(changed.actor_id, Some(rh.principal.id));
}
