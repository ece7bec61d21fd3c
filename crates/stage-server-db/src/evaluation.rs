// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::EvaluationId;
use stage_workflow_core::{Evaluation, Scores};

use crate::error::{DbError, Result};
use crate::row::{parse, parse_date, parse_opt, parse_timestamp, timestamp};
use crate::scope::ListScope;

const SELECT_EVALUATION: &str = r#"
	SELECT e.id, e.internship_id, i.user_id AS intern_user_id, e.evaluator_id,
	       e.evaluation_type, e.period_start, e.period_end, e.technical,
	       e.interpersonal, e.autonomy, e.punctuality, e.motivation, e.overall_score,
	       e.strengths, e.improvements, e.general_comment, e.status, e.created_at,
	       e.updated_at
	FROM evaluations e
	LEFT JOIN internships i ON i.id = e.internship_id
"#;

#[async_trait]
pub trait EvaluationStore: Send + Sync {
	async fn create_evaluation(&self, evaluation: &Evaluation) -> Result<()>;
	async fn get_evaluation(&self, id: &EvaluationId) -> Result<Option<Evaluation>>;
	async fn list_evaluations(&self, scope: ListScope) -> Result<Vec<Evaluation>>;
	async fn update_evaluation(&self, evaluation: &Evaluation) -> Result<bool>;
	async fn delete_evaluation(&self, id: &EvaluationId) -> Result<bool>;
}

#[async_trait]
impl EvaluationStore for EvaluationRepository {
	async fn create_evaluation(&self, evaluation: &Evaluation) -> Result<()> {
		self.create_evaluation(evaluation).await
	}

	async fn get_evaluation(&self, id: &EvaluationId) -> Result<Option<Evaluation>> {
		self.get_evaluation(id).await
	}

	async fn list_evaluations(&self, scope: ListScope) -> Result<Vec<Evaluation>> {
		self.list_evaluations(scope).await
	}

	async fn update_evaluation(&self, evaluation: &Evaluation) -> Result<bool> {
		self.update_evaluation(evaluation).await
	}

	async fn delete_evaluation(&self, id: &EvaluationId) -> Result<bool> {
		self.delete_evaluation(id).await
	}
}

#[derive(Clone)]
pub struct EvaluationRepository {
	pool: SqlitePool,
}

impl EvaluationRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, evaluation), fields(evaluation_id = %evaluation.id, evaluator_id = %evaluation.evaluator_id))]
	pub async fn create_evaluation(&self, evaluation: &Evaluation) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO evaluations (
				id, internship_id, evaluator_id, evaluation_type, period_start, period_end,
				technical, interpersonal, autonomy, punctuality, motivation, overall_score,
				strengths, improvements, general_comment, status, created_at, updated_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(evaluation.id.to_string())
		.bind(evaluation.internship_id.to_string())
		.bind(evaluation.evaluator_id.to_string())
		.bind(evaluation.evaluation_type.as_str())
		.bind(evaluation.period_start.format("%Y-%m-%d").to_string())
		.bind(evaluation.period_end.format("%Y-%m-%d").to_string())
		.bind(i64::from(evaluation.scores.technical))
		.bind(i64::from(evaluation.scores.interpersonal))
		.bind(i64::from(evaluation.scores.autonomy))
		.bind(i64::from(evaluation.scores.punctuality))
		.bind(i64::from(evaluation.scores.motivation))
		.bind(evaluation.overall_score)
		.bind(&evaluation.strengths)
		.bind(&evaluation.improvements)
		.bind(&evaluation.general_comment)
		.bind(evaluation.status.as_str())
		.bind(timestamp(evaluation.created_at))
		.bind(timestamp(evaluation.updated_at))
		.execute(&self.pool)
		.await?;

		tracing::debug!(evaluation_id = %evaluation.id, overall_score = evaluation.overall_score, "evaluation created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(evaluation_id = %id))]
	pub async fn get_evaluation(&self, id: &EvaluationId) -> Result<Option<Evaluation>> {
		let row = sqlx::query(&format!("{SELECT_EVALUATION} WHERE e.id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|row| parse_evaluation_row(&row)).transpose()
	}

	/// Evaluations within `scope`, newest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_evaluations(&self, scope: ListScope) -> Result<Vec<Evaluation>> {
		let order = "ORDER BY e.created_at DESC, e.id ASC";
		let rows = match scope {
			ListScope::All => {
				sqlx::query(&format!("{SELECT_EVALUATION} {order}"))
					.fetch_all(&self.pool)
					.await?
			}
			ListScope::Tutor(evaluator_id) => {
				sqlx::query(&format!("{SELECT_EVALUATION} WHERE e.evaluator_id = ? {order}"))
					.bind(evaluator_id.to_string())
					.fetch_all(&self.pool)
					.await?
			}
			ListScope::Intern(user_id) => {
				sqlx::query(&format!("{SELECT_EVALUATION} WHERE i.user_id = ? {order}"))
					.bind(user_id.to_string())
					.fetch_all(&self.pool)
					.await?
			}
		};

		let evaluations = rows.iter().map(parse_evaluation_row).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = evaluations.len(), "listed evaluations");
		Ok(evaluations)
	}

	/// Overwrite the mutable fields. Returns `false` when the row is missing or
	/// was already finalized.
	#[tracing::instrument(skip(self, evaluation), fields(evaluation_id = %evaluation.id, status = %evaluation.status))]
	pub async fn update_evaluation(&self, evaluation: &Evaluation) -> Result<bool> {
		let result = sqlx::query(
			r#"
			UPDATE evaluations
			SET evaluation_type = ?, period_start = ?, period_end = ?, technical = ?,
			    interpersonal = ?, autonomy = ?, punctuality = ?, motivation = ?,
			    overall_score = ?, strengths = ?, improvements = ?, general_comment = ?,
			    status = ?, updated_at = ?
			WHERE id = ? AND status <> 'finalized'
			"#,
		)
		.bind(evaluation.evaluation_type.as_str())
		.bind(evaluation.period_start.format("%Y-%m-%d").to_string())
		.bind(evaluation.period_end.format("%Y-%m-%d").to_string())
		.bind(i64::from(evaluation.scores.technical))
		.bind(i64::from(evaluation.scores.interpersonal))
		.bind(i64::from(evaluation.scores.autonomy))
		.bind(i64::from(evaluation.scores.punctuality))
		.bind(i64::from(evaluation.scores.motivation))
		.bind(evaluation.overall_score)
		.bind(&evaluation.strengths)
		.bind(&evaluation.improvements)
		.bind(&evaluation.general_comment)
		.bind(evaluation.status.as_str())
		.bind(timestamp(evaluation.updated_at))
		.bind(evaluation.id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(evaluation_id = %id))]
	pub async fn delete_evaluation(&self, id: &EvaluationId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM evaluations WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::info!(evaluation_id = %id, "evaluation deleted");
		}
		Ok(deleted)
	}
}

fn score(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<i64> {
	Ok(row.try_get::<i64, _>(column)?)
}

fn parse_evaluation_row(row: &sqlx::sqlite::SqliteRow) -> Result<Evaluation> {
	let id: String = row.get("id");
	let internship_id: String = row.get("internship_id");
	let evaluator_id: String = row.get("evaluator_id");
	let evaluation_type: String = row.get("evaluation_type");
	let period_start: String = row.get("period_start");
	let period_end: String = row.get("period_end");
	let status: String = row.get("status");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	let scores = Scores::try_new(
		score(row, "technical")?,
		score(row, "interpersonal")?,
		score(row, "autonomy")?,
		score(row, "punctuality")?,
		score(row, "motivation")?,
	)
	.map_err(|e| DbError::Internal(format!("Invalid stored scores: {e}")))?;

	Ok(Evaluation {
		id: parse(&id, "evaluation id")?,
		internship_id: parse(&internship_id, "internship_id")?,
		intern_user_id: parse_opt(row.get("intern_user_id"), "intern_user_id")?,
		evaluator_id: parse(&evaluator_id, "evaluator_id")?,
		evaluation_type: parse(&evaluation_type, "evaluation_type")?,
		period_start: parse_date(&period_start, "period_start")?,
		period_end: parse_date(&period_end, "period_end")?,
		scores,
		overall_score: row.get("overall_score"),
		strengths: row.get("strengths"),
		improvements: row.get("improvements"),
		general_comment: row.get("general_comment"),
		status: parse(&status, "status")?,
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}
