// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::{InternshipId, UserId};
use stage_workflow_core::{Internship, TutorLoad};

use crate::error::{DbError, Result};
use crate::row::{parse, parse_date, parse_opt, parse_timestamp, timestamp};
use crate::scope::ListScope;

#[async_trait]
pub trait InternshipStore: Send + Sync {
	async fn create_internship(&self, internship: &Internship) -> Result<()>;
	async fn get_internship(&self, id: &InternshipId) -> Result<Option<Internship>>;
	async fn get_current_internship_for_user(&self, user_id: &UserId) -> Result<Option<Internship>>;
	async fn list_internships(&self, scope: ListScope) -> Result<Vec<Internship>>;
	async fn list_tutor_loads(&self) -> Result<Vec<TutorLoad>>;
}

#[async_trait]
impl InternshipStore for InternshipRepository {
	async fn create_internship(&self, internship: &Internship) -> Result<()> {
		self.create_internship(internship).await
	}

	async fn get_internship(&self, id: &InternshipId) -> Result<Option<Internship>> {
		self.get_internship(id).await
	}

	async fn get_current_internship_for_user(&self, user_id: &UserId) -> Result<Option<Internship>> {
		self.get_current_internship_for_user(user_id).await
	}

	async fn list_internships(&self, scope: ListScope) -> Result<Vec<Internship>> {
		self.list_internships(scope).await
	}

	async fn list_tutor_loads(&self) -> Result<Vec<TutorLoad>> {
		self.list_tutor_loads().await
	}
}

#[derive(Clone)]
pub struct InternshipRepository {
	pool: SqlitePool,
}

impl InternshipRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, internship), fields(internship_id = %internship.id, user_id = %internship.user_id))]
	pub async fn create_internship(&self, internship: &Internship) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO internships (
				id, user_id, company_name, position, tutor_id, status,
				start_date, end_date, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(internship.id.to_string())
		.bind(internship.user_id.to_string())
		.bind(&internship.company_name)
		.bind(&internship.position)
		.bind(internship.tutor_id.map(|t| t.to_string()))
		.bind(internship.status.as_str())
		.bind(internship.start_date.format("%Y-%m-%d").to_string())
		.bind(internship.end_date.format("%Y-%m-%d").to_string())
		.bind(timestamp(internship.created_at))
		.bind(timestamp(internship.updated_at))
		.execute(&self.pool)
		.await?;

		tracing::debug!(internship_id = %internship.id, "internship created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(internship_id = %id))]
	pub async fn get_internship(&self, id: &InternshipId) -> Result<Option<Internship>> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, company_name, position, tutor_id, status,
			       start_date, end_date, created_at, updated_at
			FROM internships
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|row| parse_internship_row(&row)).transpose()
	}

	/// The user's active internship, else their most recent one.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_current_internship_for_user(&self, user_id: &UserId) -> Result<Option<Internship>> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, company_name, position, tutor_id, status,
			       start_date, end_date, created_at, updated_at
			FROM internships
			WHERE user_id = ?
			ORDER BY (status = 'active') DESC, created_at DESC
			LIMIT 1
			"#,
		)
		.bind(user_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|row| parse_internship_row(&row)).transpose()
	}

	/// Internships within `scope`, newest first. A tutor's scope is the
	/// internships they supervise.
	#[tracing::instrument(skip(self))]
	pub async fn list_internships(&self, scope: ListScope) -> Result<Vec<Internship>> {
		let select = "SELECT id, user_id, company_name, position, tutor_id, status, \
			start_date, end_date, created_at, updated_at FROM internships";
		let order = "ORDER BY created_at DESC, id ASC";
		let rows = match scope {
			ListScope::All => {
				sqlx::query(&format!("{select} {order}"))
					.fetch_all(&self.pool)
					.await?
			}
			ListScope::Tutor(tutor_id) => {
				sqlx::query(&format!("{select} WHERE tutor_id = ? {order}"))
					.bind(tutor_id.to_string())
					.fetch_all(&self.pool)
					.await?
			}
			ListScope::Intern(user_id) => {
				sqlx::query(&format!("{select} WHERE user_id = ? {order}"))
					.bind(user_id.to_string())
					.fetch_all(&self.pool)
					.await?
			}
		};

		let internships = rows.iter().map(parse_internship_row).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = internships.len(), "listed internships");
		Ok(internships)
	}

	/// Active tutors with their count of active internships, oldest account first.
	#[tracing::instrument(skip(self))]
	pub async fn list_tutor_loads(&self) -> Result<Vec<TutorLoad>> {
		let rows = sqlx::query(
			r#"
			SELECT u.id AS tutor_id,
			       (SELECT COUNT(*) FROM internships i
			        WHERE i.tutor_id = u.id AND i.status = 'active') AS current_interns
			FROM users u
			WHERE u.role = 'tutor' AND u.is_active = 1
			ORDER BY u.created_at ASC, u.id ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let mut loads = Vec::with_capacity(rows.len());
		for row in rows {
			let tutor_id: String = row.get("tutor_id");
			let count: i64 = row.get("current_interns");
			let current_interns = u32::try_from(count)
				.map_err(|e| DbError::Internal(format!("Invalid intern count: {e}")))?;
			loads.push(TutorLoad::new(parse(&tutor_id, "tutor_id")?, current_interns));
		}
		tracing::debug!(count = loads.len(), "listed tutor loads");
		Ok(loads)
	}
}

fn parse_internship_row(row: &sqlx::sqlite::SqliteRow) -> Result<Internship> {
	let id: String = row.get("id");
	let user_id: String = row.get("user_id");
	let status: String = row.get("status");
	let start_date: String = row.get("start_date");
	let end_date: String = row.get("end_date");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Internship {
		id: parse(&id, "internship id")?,
		user_id: parse(&user_id, "user_id")?,
		company_name: row.get("company_name"),
		position: row.get("position"),
		tutor_id: parse_opt(row.get("tutor_id"), "tutor_id")?,
		status: parse(&status, "status")?,
		start_date: parse_date(&start_date, "start_date")?,
		end_date: parse_date(&end_date, "end_date")?,
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}
