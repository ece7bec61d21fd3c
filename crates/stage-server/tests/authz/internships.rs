// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internship reads.

use axum::http::{Method, StatusCode};

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp, TestUser};

fn ids(body: &serde_json::Value) -> Vec<String> {
	body["data"]
		.as_array()
		.unwrap()
		.iter()
		.map(|i| i["id"].as_str().unwrap().to_string())
		.collect()
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let a = f.intern_a.internship.id.to_string();
	let b = f.intern_b.internship.id.to_string();

	for staff in [&f.admin, &f.rh] {
		let body = json_body(app.get("/api/internships", Some(staff)).await).await;
		assert_eq!(body["total"], 2);
	}

	let supervised = json_body(app.get("/api/internships", Some(&f.tutor)).await).await;
	assert_eq!(ids(&supervised), vec![a.clone()]);
	assert_eq!(supervised["data"][0]["tutor_id"], f.tutor.id());

	let other = json_body(app.get("/api/internships", Some(&f.other_tutor)).await).await;
	assert_eq!(ids(&other), vec![b.clone()]);

	let own = json_body(app.get("/api/internships", Some(&f.intern_a.user)).await).await;
	assert_eq!(ids(&own), vec![a]);
	assert_eq!(own["data"][0]["user_id"], f.intern_a.user.id());

	let own_b = json_body(app.get("/api/internships", Some(&f.intern_b.user)).await).await;
	assert_eq!(ids(&own_b), vec![b]);
}

#[tokio::test]
async fn listing_requires_an_active_principal() {
	let app = TestApp::new().await;

	let anonymous = app.get("/api/internships", None).await;
	assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

	let inactive = app.get("/api/internships", Some(&app.fixtures.inactive)).await;
	assert_eq!(inactive.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn read_follows_policy() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let path = format!("/api/internships/{}", f.intern_a.internship.id);

	let case = |name, user: &TestUser, expected_status| AuthzCase {
		name,
		method: Method::GET,
		path: path.clone(),
		user: Some(user.clone()),
		body: None,
		expected_status,
	};
	let cases = [
		case("admin", &f.admin, StatusCode::OK),
		case("rh", &f.rh, StatusCode::OK),
		case("supervising tutor", &f.tutor, StatusCode::OK),
		case("owning intern", &f.intern_a.user, StatusCode::OK),
		case("other tutor", &f.other_tutor, StatusCode::FORBIDDEN),
		case("other intern", &f.intern_b.user, StatusCode::FORBIDDEN),
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn unknown_or_malformed_id() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;

	let unknown = app
		.get(
			&format!("/api/internships/{}", stage_server_auth::InternshipId::generate()),
			Some(admin),
		)
		.await;
	assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

	let malformed = app.get("/api/internships/not-an-id", Some(admin)).await;
	assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}
