// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User administration.

use axum::http::{Method, StatusCode};
use serde_json::json;
use stage_server_auth::{AuditEventType, Role};

use super::support::{create_test_user, json_body, run_authz_cases, AuthzCase, TestApp, TestUser};

fn new_user(email: &str, role: &str) -> serde_json::Value {
	json!({
		"email": email,
		"password": "secret-pass",
		"name": "New Person",
		"role": role,
	})
}

#[tokio::test]
async fn user_management_is_admin_only() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let target = format!("/api/admin/users/{}", f.tutor.id());

	let mut cases = Vec::new();
	for (name, user) in [("rh", &f.rh), ("tutor", &f.tutor), ("intern", &f.intern_a.user)] {
		cases.push(AuthzCase {
			name,
			method: Method::GET,
			path: "/api/admin/users".to_string(),
			user: Some(user.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		});
		cases.push(AuthzCase {
			name,
			method: Method::POST,
			path: "/api/admin/users".to_string(),
			user: Some(user.clone()),
			body: Some(new_user("blocked@test.com", "tutor")),
			expected_status: StatusCode::FORBIDDEN,
		});
		cases.push(AuthzCase {
			name,
			method: Method::PATCH,
			path: target.clone(),
			user: Some(user.clone()),
			body: Some(json!({ "is_active": false })),
			expected_status: StatusCode::FORBIDDEN,
		});
	}
	cases.push(AuthzCase {
		name: "admin lists",
		method: Method::GET,
		path: "/api/admin/users".to_string(),
		user: Some(f.admin.clone()),
		body: None,
		expected_status: StatusCode::OK,
	});

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn listing_includes_every_account() {
	let app = TestApp::new().await;

	let body = json_body(app.get("/api/admin/users", Some(&app.fixtures.admin)).await).await;

	assert_eq!(body["total"], 7);
}

#[tokio::test]
async fn creating_an_intern_assigns_least_loaded_tutor() {
	let app = TestApp::new().await;
	let idle_tutor: TestUser =
		create_test_user(&app.state, "idle@test.com", "Idle Tutor", Role::Tutor).await;

	let response = app
		.post(
			"/api/admin/users",
			Some(&app.fixtures.admin),
			new_user("  Newbie@Test.com ", "intern"),
		)
		.await;

	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	assert_eq!(body["data"]["user"]["email"], "newbie@test.com");
	assert_eq!(body["data"]["user"]["role"], "intern");
	let internship = &body["data"]["internship"];
	assert_eq!(internship["tutor_id"], idle_tutor.id());
	assert_eq!(internship["user_id"], body["data"]["user"]["id"]);
	assert_eq!(internship["status"], "active");
}

#[tokio::test]
async fn non_intern_accounts_get_no_internship() {
	let app = TestApp::new().await;

	let response = app
		.post("/api/admin/users", Some(&app.fixtures.admin), new_user("coach@test.com", "tutor"))
		.await;

	assert_eq!(response.status(), StatusCode::CREATED);
	assert!(json_body(response).await["data"]["internship"].is_null());
}

#[tokio::test]
async fn create_user_validation() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;

	let duplicate = app
		.post("/api/admin/users", Some(admin), new_user("RH@test.com", "rh"))
		.await;
	assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
	assert!(json_body(duplicate).await["fields"]["email"].is_string());

	let invalid = app
		.post(
			"/api/admin/users",
			Some(admin),
			json!({ "email": "not-an-email", "password": "x", "name": " ", "role": "boss" }),
		)
		.await;
	assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
	let fields = &json_body(invalid).await["fields"];
	for field in ["email", "password", "name", "role"] {
		assert!(fields[field].is_string(), "{field} should be reported");
	}
}

#[tokio::test]
async fn admins_cannot_demote_or_deactivate_themselves() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;
	let own = format!("/api/admin/users/{}", admin.id());

	let demote = app.patch(&own, Some(admin), json!({ "role": "rh" })).await;
	assert_eq!(demote.status(), StatusCode::FORBIDDEN);

	let deactivate = app.patch(&own, Some(admin), json!({ "is_active": false })).await;
	assert_eq!(deactivate.status(), StatusCode::FORBIDDEN);

	let noop = app.patch(&own, Some(admin), json!({ "role": "admin" })).await;
	assert_eq!(noop.status(), StatusCode::OK);
}

#[tokio::test]
async fn update_user_requires_a_change() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;
	let path = format!("/api/admin/users/{}", app.fixtures.tutor.id());

	let empty = app.patch(&path, Some(admin), json!({})).await;
	assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

	let bad_role = app.patch(&path, Some(admin), json!({ "role": "boss" })).await;
	assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);

	let unknown = app
		.patch(
			&format!("/api/admin/users/{}", stage_server_auth::UserId::generate()),
			Some(admin),
			json!({ "role": "rh" }),
		)
		.await;
	assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_and_active_changes_are_applied_and_audited() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/admin/users/{}", f.tutor.id());

	let response = app
		.patch(&path, Some(&f.admin), json!({ "role": "rh", "is_active": false }))
		.await;

	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["data"]["role"], "rh");
	assert_eq!(body["data"]["is_active"], false);

	let entries = app.state.audit_repo.list_recent(10).await.unwrap();
	let role_change = entries
		.iter()
		.find(|e| e.event_type == AuditEventType::RoleChanged)
		.expect("role change audited");
	assert_eq!(role_change.actor_id, Some(f.admin.principal.id));
	assert_eq!(role_change.target_id.as_deref(), Some(f.tutor.id().as_str()));
	assert_eq!(role_change.details["from"], "tutor");
	assert_eq!(role_change.details["to"], "rh");
	assert!(entries
		.iter()
		.any(|e| e.event_type == AuditEventType::ActiveChanged));

	let me = app.get("/api/requests", Some(&f.tutor)).await;
	assert_eq!(me.status(), StatusCode::FORBIDDEN);
}
