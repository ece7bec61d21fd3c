// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request repository.
//!
//! Requests are loaded joined with their internship so the owning intern is
//! known. Status changes go through [`RequestRepository::apply_decision`], a
//! conditional update that only succeeds while the stored status still matches
//! the status the decision was computed from.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::RequestId;
use stage_workflow_core::{Decision, InternRequest};

use crate::error::Result;
use crate::row::{parse, parse_opt, parse_opt_timestamp, parse_timestamp, timestamp};
use crate::scope::ListScope;

const SELECT_REQUEST: &str = r#"
	SELECT r.id, r.request_type, r.status, r.internship_id, i.user_id AS intern_user_id,
	       r.tutor_id, r.description, r.response_comment, r.created_at, r.responded_at
	FROM requests r
	JOIN internships i ON i.id = r.internship_id
"#;

#[async_trait]
pub trait RequestStore: Send + Sync {
	async fn create_request(&self, request: &InternRequest) -> Result<()>;
	async fn get_request(&self, id: &RequestId) -> Result<Option<InternRequest>>;
	async fn list_requests(&self, scope: ListScope) -> Result<Vec<InternRequest>>;
	async fn apply_decision(&self, id: &RequestId, decision: &Decision) -> Result<bool>;
	async fn set_response_comment(&self, id: &RequestId, comment: &str) -> Result<bool>;
}

#[async_trait]
impl RequestStore for RequestRepository {
	async fn create_request(&self, request: &InternRequest) -> Result<()> {
		self.create_request(request).await
	}

	async fn get_request(&self, id: &RequestId) -> Result<Option<InternRequest>> {
		self.get_request(id).await
	}

	async fn list_requests(&self, scope: ListScope) -> Result<Vec<InternRequest>> {
		self.list_requests(scope).await
	}

	async fn apply_decision(&self, id: &RequestId, decision: &Decision) -> Result<bool> {
		self.apply_decision(id, decision).await
	}

	async fn set_response_comment(&self, id: &RequestId, comment: &str) -> Result<bool> {
		self.set_response_comment(id, comment).await
	}
}

#[derive(Clone)]
pub struct RequestRepository {
	pool: SqlitePool,
}

impl RequestRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, request), fields(request_id = %request.id, internship_id = %request.internship_id))]
	pub async fn create_request(&self, request: &InternRequest) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO requests (
				id, request_type, status, internship_id, tutor_id, description,
				response_comment, created_at, responded_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(request.id.to_string())
		.bind(request.request_type.as_str())
		.bind(request.status.as_str())
		.bind(request.internship_id.to_string())
		.bind(request.tutor_id.map(|t| t.to_string()))
		.bind(&request.description)
		.bind(&request.response_comment)
		.bind(timestamp(request.created_at))
		.bind(request.responded_at.map(timestamp))
		.execute(&self.pool)
		.await?;

		tracing::debug!(request_id = %request.id, "request created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(request_id = %id))]
	pub async fn get_request(&self, id: &RequestId) -> Result<Option<InternRequest>> {
		let row = sqlx::query(&format!("{SELECT_REQUEST} WHERE r.id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|row| parse_request_row(&row)).transpose()
	}

	/// Requests within `scope`, newest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_requests(&self, scope: ListScope) -> Result<Vec<InternRequest>> {
		let order = "ORDER BY r.created_at DESC, r.id ASC";
		let rows = match scope {
			ListScope::All => {
				sqlx::query(&format!("{SELECT_REQUEST} {order}"))
					.fetch_all(&self.pool)
					.await?
			}
			ListScope::Tutor(tutor_id) => {
				sqlx::query(&format!("{SELECT_REQUEST} WHERE r.tutor_id = ? {order}"))
					.bind(tutor_id.to_string())
					.fetch_all(&self.pool)
					.await?
			}
			ListScope::Intern(user_id) => {
				sqlx::query(&format!("{SELECT_REQUEST} WHERE i.user_id = ? {order}"))
					.bind(user_id.to_string())
					.fetch_all(&self.pool)
					.await?
			}
		};

		let requests = rows.iter().map(parse_request_row).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = requests.len(), "listed requests");
		Ok(requests)
	}

	/// Persist a decision. Returns `false` when the stored status no longer
	/// equals `decision.from`, i.e. a concurrent decision won.
	#[tracing::instrument(skip(self, decision), fields(request_id = %id, status = %decision.status))]
	pub async fn apply_decision(&self, id: &RequestId, decision: &Decision) -> Result<bool> {
		let result = sqlx::query(
			r#"
			UPDATE requests
			SET status = ?, response_comment = ?, responded_at = ?
			WHERE id = ? AND status = ?
			"#,
		)
		.bind(decision.status.as_str())
		.bind(&decision.response_comment)
		.bind(timestamp(decision.responded_at))
		.bind(id.to_string())
		.bind(decision.from.as_str())
		.execute(&self.pool)
		.await?;

		let applied = result.rows_affected() > 0;
		if applied {
			tracing::info!(request_id = %id, status = %decision.status, "request decided");
		}
		Ok(applied)
	}

	/// Replace the response comment without touching status.
	#[tracing::instrument(skip(self, comment), fields(request_id = %id))]
	pub async fn set_response_comment(&self, id: &RequestId, comment: &str) -> Result<bool> {
		let result = sqlx::query("UPDATE requests SET response_comment = ? WHERE id = ?")
			.bind(comment)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		tracing::debug!(request_id = %id, "request comment updated");
		Ok(result.rows_affected() > 0)
	}
}

fn parse_request_row(row: &sqlx::sqlite::SqliteRow) -> Result<InternRequest> {
	let id: String = row.get("id");
	let request_type: String = row.get("request_type");
	let status: String = row.get("status");
	let internship_id: String = row.get("internship_id");
	let intern_user_id: String = row.get("intern_user_id");
	let created_at: String = row.get("created_at");

	Ok(InternRequest {
		id: parse(&id, "request id")?,
		request_type: parse(&request_type, "request_type")?,
		status: parse(&status, "status")?,
		internship_id: parse(&internship_id, "internship_id")?,
		intern_user_id: parse(&intern_user_id, "intern_user_id")?,
		tutor_id: parse_opt(row.get("tutor_id"), "tutor_id")?,
		description: row.get("description"),
		response_comment: row.get("response_comment"),
		created_at: parse_timestamp(&created_at, "created_at")?,
		responded_at: parse_opt_timestamp(row.get("responded_at"), "responded_at")?,
	})
}
