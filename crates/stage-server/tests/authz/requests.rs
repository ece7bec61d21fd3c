// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization and lifecycle tests for intern requests.

use axum::http::{Method, StatusCode};
use serde_json::json;
use stage_server_auth::RequestId;

use super::support::{create_request, json_body, run_authz_cases, AuthzCase, TestApp};

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn request_read_follows_policy() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_request(&app, &f.intern_a.user, "leave").await;
	let path = format!("/api/requests/{id}");

	let cases = [
		AuthzCase {
			name: "anonymous",
			method: Method::GET,
			path: path.clone(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "admin",
			method: Method::GET,
			path: path.clone(),
			user: Some(f.admin.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "rh",
			method: Method::GET,
			path: path.clone(),
			user: Some(f.rh.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "assigned tutor",
			method: Method::GET,
			path: path.clone(),
			user: Some(f.tutor.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "owning intern",
			method: Method::GET,
			path: path.clone(),
			user: Some(f.intern_a.user.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "unrelated tutor",
			method: Method::GET,
			path: path.clone(),
			user: Some(f.other_tutor.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "other intern",
			method: Method::GET,
			path: path.clone(),
			user: Some(f.intern_b.user.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "inactive admin",
			method: Method::GET,
			path,
			user: Some(f.inactive.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;

	let missing = app
		.get(&format!("/api/requests/{}", RequestId::generate()), Some(admin))
		.await;
	assert_eq!(missing.status(), StatusCode::NOT_FOUND);

	let malformed = app.get("/api/requests/not-an-id", Some(admin)).await;
	assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(malformed).await["error"], "validation_error");
}

#[tokio::test]
async fn listing_is_filtered_per_principal() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let a = create_request(&app, &f.intern_a.user, "leave").await;
	let b = create_request(&app, &f.intern_b.user, "extension").await;

	let ids_for = |body: serde_json::Value| -> Vec<String> {
		body["data"]
			.as_array()
			.unwrap()
			.iter()
			.map(|r| r["id"].as_str().unwrap().to_string())
			.collect()
	};

	let rh = json_body(app.get("/api/requests", Some(&f.rh)).await).await;
	assert_eq!(rh["total"], 2);
	let rh_ids = ids_for(rh);
	assert!(rh_ids.contains(&a) && rh_ids.contains(&b));

	let tutor = ids_for(json_body(app.get("/api/requests", Some(&f.tutor)).await).await);
	assert_eq!(tutor, vec![a.clone()]);

	let intern_b = ids_for(json_body(app.get("/api/requests", Some(&f.intern_b.user)).await).await);
	assert_eq!(intern_b, vec![b]);

	let other_tutor = ids_for(json_body(app.get("/api/requests", Some(&f.other_tutor)).await).await);
	assert!(!other_tutor.contains(&a));
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn only_the_owning_intern_creates_requests() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let body = json!({ "type": "leave", "description": "Two days off" });

	let cases = [
		AuthzCase {
			name: "admin cannot submit",
			method: Method::POST,
			path: "/api/requests".to_string(),
			user: Some(f.admin.clone()),
			body: Some(body.clone()),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "tutor cannot submit",
			method: Method::POST,
			path: "/api/requests".to_string(),
			user: Some(f.tutor.clone()),
			body: Some(body.clone()),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "intern on someone else's internship",
			method: Method::POST,
			path: "/api/requests".to_string(),
			user: Some(f.intern_a.user.clone()),
			body: Some(json!({
				"type": "leave",
				"description": "Two days off",
				"internship_id": f.intern_b.internship.id.to_string(),
			})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "intern on own internship",
			method: Method::POST,
			path: "/api/requests".to_string(),
			user: Some(f.intern_a.user.clone()),
			body: Some(body),
			expected_status: StatusCode::CREATED,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn new_request_is_pending_and_carries_the_tutor() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let response = app
		.post(
			"/api/requests",
			Some(&f.intern_a.user),
			json!({ "type": "tutor_change", "description": "Different field" }),
		)
		.await;

	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	assert_eq!(body["data"]["status"], "pending");
	assert_eq!(body["data"]["type"], "tutor_change");
	assert_eq!(body["data"]["tutor_id"], f.tutor.id());
	assert_eq!(
		body["data"]["internship_id"],
		f.intern_a.internship.id.to_string()
	);
}

#[tokio::test]
async fn invalid_request_payloads() {
	let app = TestApp::new().await;
	let intern = &app.fixtures.intern_a.user;

	let bad_type = app
		.post(
			"/api/requests",
			Some(intern),
			json!({ "type": "sabbatical", "description": "x" }),
		)
		.await;
	assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);
	assert!(json_body(bad_type).await["fields"]["type"].is_string());

	let unknown_internship = app
		.post(
			"/api/requests",
			Some(intern),
			json!({
				"type": "leave",
				"description": "x",
				"internship_id": RequestId::generate().to_string(),
			}),
		)
		.await;
	assert_eq!(unknown_internship.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Status and comments
// ============================================================================

#[tokio::test]
async fn status_changes_are_staff_only() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_request(&app, &f.intern_a.user, "leave").await;
	let path = format!("/api/requests/{id}");

	let cases = [
		AuthzCase {
			name: "assigned tutor cannot decide",
			method: Method::PUT,
			path: path.clone(),
			user: Some(f.tutor.clone()),
			body: Some(json!({ "status": "approved" })),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "intern cannot decide",
			method: Method::PUT,
			path: path.clone(),
			user: Some(f.intern_a.user.clone()),
			body: Some(json!({ "status": "approved" })),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "intern cannot comment",
			method: Method::PUT,
			path: path.clone(),
			user: Some(f.intern_a.user.clone()),
			body: Some(json!({ "response_comment": "please" })),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "rh approves",
			method: Method::PUT,
			path,
			user: Some(f.rh.clone()),
			body: Some(json!({ "status": "approved", "response_comment": "Enjoy" })),
			expected_status: StatusCode::OK,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn decided_requests_are_terminal() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_request(&app, &f.intern_a.user, "extension").await;
	let path = format!("/api/requests/{id}");

	let approved = app
		.put(&path, Some(&f.admin), json!({ "status": "approved" }))
		.await;
	assert_eq!(approved.status(), StatusCode::OK);
	let body = json_body(approved).await;
	assert_eq!(body["data"]["status"], "approved");
	assert!(body["data"]["responded_at"].is_string());

	for target in ["rejected", "pending", "approved"] {
		let response = app
			.put(&path, Some(&f.rh), json!({ "status": target }))
			.await;
		assert_eq!(
			response.status(),
			StatusCode::BAD_REQUEST,
			"approved -> {target} must fail"
		);
		assert_eq!(json_body(response).await["error"], "invalid_transition");
	}
}

#[tokio::test]
async fn tutor_comment_leaves_status_alone() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_request(&app, &f.intern_a.user, "modification").await;
	let path = format!("/api/requests/{id}");

	let response = app
		.put(&path, Some(&f.tutor), json!({ "response_comment": "  Looks fine  " }))
		.await;

	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["data"]["status"], "pending");
	assert_eq!(body["data"]["response_comment"], "Looks fine");

	let empty = app.put(&path, Some(&f.tutor), json!({})).await;
	assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

	let unrelated = app
		.put(&path, Some(&f.other_tutor), json!({ "response_comment": "hi" }))
		.await;
	assert_eq!(unrelated.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Required documents
// ============================================================================

#[tokio::test]
async fn attaching_documents_requires_owner_and_types() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_request(&app, &f.intern_a.user, "leave").await;
	let path = format!("/api/requests/{id}/documents");

	let by_tutor = app
		.post(
			&path,
			Some(&f.tutor),
			json!({ "documents": [{ "type": "medical_certificate" }] }),
		)
		.await;
	assert_eq!(by_tutor.status(), StatusCode::FORBIDDEN);

	let untyped = app
		.post(
			&path,
			Some(&f.intern_a.user),
			json!({ "documents": [{ "type": "cv" }, { "mandatory": true }] }),
		)
		.await;
	assert_eq!(untyped.status(), StatusCode::BAD_REQUEST);
	let body = json_body(untyped).await;
	assert!(body["fields"]["documents[1].type"].is_string());

	let nothing_written = json_body(app.get(&path, Some(&f.intern_a.user)).await).await;
	assert_eq!(nothing_written["total"], 0);
}

#[tokio::test]
async fn attached_documents_appear_in_merged_listing() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let intern = &f.intern_a.user;
	let id = create_request(&app, intern, "leave").await;

	let direct = app
		.upload(
			Some(intern),
			Some(("notes.txt", b"direct upload".as_slice())),
			&[("request_id", id.as_str())],
		)
		.await;
	assert_eq!(direct.status(), StatusCode::CREATED);
	let direct_id = json_body(direct).await["data"]["document"]["id"]
		.as_str()
		.unwrap()
		.to_string();

	let linked = app
		.upload(Some(intern), Some(("certificate.pdf", b"%PDF-1.4".as_slice())), &[])
		.await;
	let linked_id = json_body(linked).await["data"]["document"]["id"]
		.as_str()
		.unwrap()
		.to_string();

	let path = format!("/api/requests/{id}/documents");
	let attach = app
		.post(
			&path,
			Some(intern),
			json!({ "documents": [
				{ "type": "medical_certificate", "document_id": linked_id, "mandatory": true },
				{ "type": "notes", "document_id": direct_id },
				{ "type": "photo" },
			]}),
		)
		.await;
	assert_eq!(attach.status(), StatusCode::CREATED);
	let attached = json_body(attach).await;
	assert_eq!(attached["total"], 3);
	assert_eq!(attached["data"][1]["mandatory"], false);
	assert!(attached["data"][2]["document_id"].is_null());

	let listing = json_body(app.get(&path, Some(&f.tutor)).await).await;
	let docs = listing["data"].as_array().unwrap();
	assert_eq!(docs.len(), 2, "one entry per document: {listing}");

	let find = |doc_id: &str| docs.iter().find(|d| d["id"] == doc_id).unwrap().clone();
	let certificate = find(&linked_id);
	assert_eq!(certificate["required_document_type"], "medical_certificate");
	assert_eq!(certificate["mandatory"], true);
	let notes = find(&direct_id);
	assert_eq!(notes["required_document_type"], "notes");

	let outsider = app.get(&path, Some(&f.intern_b.user)).await;
	assert_eq!(outsider.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cannot_attach_someone_elses_private_document() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_request(&app, &f.intern_a.user, "leave").await;

	let private = app
		.upload(Some(&f.intern_b.user), Some(("secret.txt", b"private".as_slice())), &[])
		.await;
	let private_id = json_body(private).await["data"]["document"]["id"]
		.as_str()
		.unwrap()
		.to_string();

	let response = app
		.post(
			&format!("/api/requests/{id}/documents"),
			Some(&f.intern_a.user),
			json!({ "documents": [{ "type": "other", "document_id": private_id }] }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
