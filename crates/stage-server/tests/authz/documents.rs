// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Upload, visibility and download of documents.

use axum::http::{header, StatusCode};
use stage_server_auth::DocumentId;

use super::support::{create_request, json_body, TestApp, TestUser};

async fn upload_id(app: &TestApp, user: &TestUser, name: &str, fields: &[(&str, &str)]) -> String {
	let response = app.upload(Some(user), Some((name, b"content".as_slice())), fields).await;
	assert_eq!(response.status(), StatusCode::CREATED);
	json_body(response).await["data"]["document"]["id"]
		.as_str()
		.unwrap()
		.to_string()
}

fn listed_ids(body: &serde_json::Value) -> Vec<String> {
	body["data"]
		.as_array()
		.unwrap()
		.iter()
		.map(|d| d["id"].as_str().unwrap().to_string())
		.collect()
}

#[tokio::test]
async fn upload_stores_sanitized_name_and_defaults() {
	let app = TestApp::new().await;
	let intern = &app.fixtures.intern_a.user;

	let response = app
		.upload(Some(intern), Some(("my report (v2).pdf", b"%PDF".as_slice())), &[])
		.await;

	assert_eq!(response.status(), StatusCode::CREATED);
	let body = json_body(response).await;
	let document = &body["data"]["document"];
	assert_eq!(document["name"], "my_report__v2_.pdf");
	assert_eq!(document["type"], "document");
	assert_eq!(document["is_public"], false);
	assert_eq!(document["owner_id"], intern.id());
	assert_eq!(document["size_bytes"], 4);

	let storage_path = body["data"]["storage_path"].as_str().unwrap();
	assert!(storage_path.starts_with(&format!("{}/", intern.id())));
	assert!(storage_path.ends_with("_my_report__v2_.pdf"));
}

#[tokio::test]
async fn upload_validation() {
	let app = TestApp::new().await;
	let intern = &app.fixtures.intern_a.user;

	let no_file = app.upload(Some(intern), None, &[("type", "cv")]).await;
	assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);
	assert!(json_body(no_file).await["fields"]["file"].is_string());

	let too_large = vec![0u8; 2048];
	let oversized = app
		.upload(Some(intern), Some(("big.bin", too_large.as_slice())), &[])
		.await;
	assert_eq!(oversized.status(), StatusCode::BAD_REQUEST);

	let anonymous = app.upload(None, Some(("a.txt", b"a".as_slice())), &[]).await;
	assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_against_unreadable_request_is_forbidden() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let request_id = create_request(&app, &f.intern_a.user, "leave").await;

	let response = app
		.upload(
			Some(&f.intern_b.user),
			Some(("sneaky.txt", b"x".as_slice())),
			&[("request_id", request_id.as_str())],
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let unknown_id = DocumentId::generate().to_string();
	let unknown = app
		.upload(
			Some(&f.intern_b.user),
			Some(("x.txt", b"x".as_slice())),
			&[("request_id", unknown_id.as_str())],
		)
		.await;
	assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_shows_own_plus_public() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let a_private = upload_id(&app, &f.intern_a.user, "a.txt", &[]).await;
	let a_public = upload_id(&app, &f.intern_a.user, "b.txt", &[("is_public", "true")]).await;
	let b_private = upload_id(&app, &f.intern_b.user, "c.txt", &[]).await;

	let seen_by_b = listed_ids(&json_body(app.get("/api/documents", Some(&f.intern_b.user)).await).await);
	assert!(seen_by_b.contains(&a_public));
	assert!(seen_by_b.contains(&b_private));
	assert!(!seen_by_b.contains(&a_private));

	let seen_by_tutor = listed_ids(&json_body(app.get("/api/documents", Some(&f.tutor)).await).await);
	assert_eq!(seen_by_tutor, vec![a_public.clone()]);

	let seen_by_rh = json_body(app.get("/api/documents", Some(&f.rh)).await).await;
	assert_eq!(seen_by_rh["total"], 3);
}

#[tokio::test]
async fn download_follows_visibility() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let private = upload_id(&app, &f.intern_a.user, "report.pdf", &[]).await;
	let public = upload_id(&app, &f.intern_a.user, "guide.txt", &[("is_public", "true")]).await;

	let own = app
		.get(&format!("/api/documents/{private}/download"), Some(&f.intern_a.user))
		.await;
	assert_eq!(own.status(), StatusCode::OK);
	assert_eq!(own.headers()[header::CONTENT_TYPE], "application/octet-stream");
	assert_eq!(
		own.headers()[header::CONTENT_DISPOSITION],
		"attachment; filename=\"report.pdf\""
	);
	assert_eq!(own.headers()[header::CONTENT_LENGTH], "7");
	let bytes = axum::body::to_bytes(own.into_body(), usize::MAX).await.unwrap();
	assert_eq!(&bytes[..], b"content");

	let by_staff = app
		.get(&format!("/api/documents/{private}/download"), Some(&f.admin))
		.await;
	assert_eq!(by_staff.status(), StatusCode::OK);

	let by_other = app
		.get(&format!("/api/documents/{private}/download"), Some(&f.intern_b.user))
		.await;
	assert_eq!(by_other.status(), StatusCode::FORBIDDEN);

	let public_by_other = app
		.get(&format!("/api/documents/{public}/download"), Some(&f.intern_b.user))
		.await;
	assert_eq!(public_by_other.status(), StatusCode::OK);

	let missing = app
		.get(
			&format!("/api/documents/{}/download", DocumentId::generate()),
			Some(&f.admin),
		)
		.await;
	assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_blob_is_not_found() {
	let app = TestApp::new().await;
	let intern = &app.fixtures.intern_a.user;
	let response = app
		.upload(Some(intern), Some(("gone.txt", b"bye".as_slice())), &[])
		.await;
	let body = json_body(response).await;
	let id = body["data"]["document"]["id"].as_str().unwrap().to_string();
	let storage_path = body["data"]["storage_path"].as_str().unwrap();

	assert!(app.state.blob_store.remove(storage_path).await.unwrap());

	let download = app
		.get(&format!("/api/documents/{id}/download"), Some(intern))
		.await;
	assert_eq!(download.status(), StatusCode::NOT_FOUND);
}
