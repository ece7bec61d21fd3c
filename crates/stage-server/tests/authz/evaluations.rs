// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization and lifecycle tests for evaluations.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{create_evaluation, json_body, run_authz_cases, AuthzCase, TestApp};

fn evaluation_body(internship_id: String) -> serde_json::Value {
	json!({
		"internship_id": internship_id,
		"type": "final",
		"period_start": "2025-04-01",
		"period_end": "2025-06-30",
		"technical": 15,
		"interpersonal": 15,
		"autonomy": 15,
		"punctuality": 15,
		"motivation": 15,
	})
}

#[tokio::test]
async fn overall_score_is_the_rounded_mean() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_evaluation(&app, &f.tutor, &f.intern_a, "draft").await;

	let body = json_body(app.get(&format!("/api/evaluations/{id}"), Some(&f.tutor)).await).await;

	assert_eq!(body["data"]["overall_score"], 14.0);
	assert_eq!(body["data"]["status"], "draft");
	assert_eq!(body["data"]["evaluator_id"], f.tutor.id());
	assert_eq!(body["data"]["intern_user_id"], f.intern_a.user.id());
}

#[tokio::test]
async fn create_is_staff_or_tutor() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let body = evaluation_body(f.intern_a.internship.id.to_string());

	let cases = [
		AuthzCase {
			name: "intern cannot evaluate",
			method: Method::POST,
			path: "/api/evaluations".to_string(),
			user: Some(f.intern_a.user.clone()),
			body: Some(body.clone()),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "tutor evaluates",
			method: Method::POST,
			path: "/api/evaluations".to_string(),
			user: Some(f.tutor.clone()),
			body: Some(body.clone()),
			expected_status: StatusCode::CREATED,
		},
		AuthzCase {
			name: "rh evaluates",
			method: Method::POST,
			path: "/api/evaluations".to_string(),
			user: Some(f.rh.clone()),
			body: Some(body),
			expected_status: StatusCode::CREATED,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn evaluator_id_rules() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let mut body = evaluation_body(f.intern_a.internship.id.to_string());

	body["evaluator_id"] = json!(f.other_tutor.id());
	let tutor_for_other = app.post("/api/evaluations", Some(&f.tutor), body.clone()).await;
	assert_eq!(tutor_for_other.status(), StatusCode::FORBIDDEN);

	let rh_for_tutor = app.post("/api/evaluations", Some(&f.rh), body.clone()).await;
	assert_eq!(rh_for_tutor.status(), StatusCode::CREATED);
	assert_eq!(
		json_body(rh_for_tutor).await["data"]["evaluator_id"],
		f.other_tutor.id()
	);

	body["evaluator_id"] = json!(stage_server_auth::UserId::generate().to_string());
	let unknown = app.post("/api/evaluations", Some(&f.rh), body).await;
	assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_scores_and_period_are_reported_per_field() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let mut body = evaluation_body(f.intern_a.internship.id.to_string());
	body["technical"] = json!(21);
	body["motivation"] = json!(-1);

	let response = app.post("/api/evaluations", Some(&f.tutor), body.clone()).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let err = json_body(response).await;
	assert!(err["fields"]["technical"].is_string());
	assert!(err["fields"]["motivation"].is_string());

	let mut backwards = evaluation_body(f.intern_a.internship.id.to_string());
	backwards["period_end"] = json!("2025-01-01");
	let response = app.post("/api/evaluations", Some(&f.tutor), backwards).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert!(json_body(response).await["fields"]["period_end"].is_string());
}

#[tokio::test]
async fn read_follows_policy() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_evaluation(&app, &f.tutor, &f.intern_a, "in_progress").await;
	let path = format!("/api/evaluations/{id}");

	let case = |name, user: &super::support::TestUser, expected_status| AuthzCase {
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
		case("evaluating tutor", &f.tutor, StatusCode::OK),
		case("evaluated intern", &f.intern_a.user, StatusCode::OK),
		case("other tutor", &f.other_tutor, StatusCode::FORBIDDEN),
		case("other intern", &f.intern_b.user, StatusCode::FORBIDDEN),
	];

	run_authz_cases(&app, &cases).await;

	let seen_by_intern_b = json_body(app.get("/api/evaluations", Some(&f.intern_b.user)).await).await;
	assert_eq!(seen_by_intern_b["total"], 0);
	let seen_by_intern_a = json_body(app.get("/api/evaluations", Some(&f.intern_a.user)).await).await;
	assert_eq!(seen_by_intern_a["total"], 1);
}

#[tokio::test]
async fn update_recomputes_score() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_evaluation(&app, &f.tutor, &f.intern_a, "draft").await;
	let path = format!("/api/evaluations/{id}");

	let response = app
		.put(&path, Some(&f.tutor), json!({ "motivation": 20, "strengths": "  Curious " }))
		.await;

	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["data"]["overall_score"], 16.0);
	assert_eq!(body["data"]["strengths"], "Curious");

	let by_intern = app.put(&path, Some(&f.intern_a.user), json!({ "motivation": 20 })).await;
	assert_eq!(by_intern.status(), StatusCode::FORBIDDEN);

	let by_other_tutor = app.put(&path, Some(&f.other_tutor), json!({ "motivation": 20 })).await;
	assert_eq!(by_other_tutor.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn finalized_evaluations_are_immutable() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_evaluation(&app, &f.tutor, &f.intern_a, "in_progress").await;
	let path = format!("/api/evaluations/{id}");

	let finalize = app.put(&path, Some(&f.tutor), json!({ "status": "finalized" })).await;
	assert_eq!(finalize.status(), StatusCode::OK);

	let edit = app.put(&path, Some(&f.admin), json!({ "technical": 1 })).await;
	assert_eq!(edit.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(edit).await["error"], "evaluation_finalized");

	let delete = app.delete(&path, Some(&f.admin)).await;
	assert_eq!(delete.status(), StatusCode::BAD_REQUEST);

	let still_there = app.get(&path, Some(&f.admin)).await;
	assert_eq!(json_body(still_there).await["data"]["technical"], 14);
}

#[tokio::test]
async fn delete_is_staff_only() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let id = create_evaluation(&app, &f.tutor, &f.intern_a, "draft").await;
	let path = format!("/api/evaluations/{id}");

	let by_tutor = app.delete(&path, Some(&f.tutor)).await;
	assert_eq!(by_tutor.status(), StatusCode::FORBIDDEN);

	let by_rh = app.delete(&path, Some(&f.rh)).await;
	assert_eq!(by_rh.status(), StatusCode::OK);

	let gone = app.get(&path, Some(&f.rh)).await;
	assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_are_staff_only_and_aggregate_everything() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	create_evaluation(&app, &f.tutor, &f.intern_a, "draft").await;
	create_evaluation(&app, &f.other_tutor, &f.intern_b, "finalized").await;

	let by_tutor = app.get("/api/evaluations/stats", Some(&f.tutor)).await;
	assert_eq!(by_tutor.status(), StatusCode::FORBIDDEN);

	let response = app.get("/api/evaluations/stats", Some(&f.rh)).await;
	assert_eq!(response.status(), StatusCode::OK);
	let stats = json_body(response).await;
	assert_eq!(stats["data"]["total"], 2);
	assert_eq!(stats["data"]["average_score"], 14.0);
	assert_eq!(stats["data"]["by_status"]["draft"], 1);
	assert_eq!(stats["data"]["by_status"]["finalized"], 1);
	assert_eq!(stats["data"]["by_type"]["mid_term"], 2);
}
