// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stage_workflow_core::{Evaluation, EvaluationStats};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// `POST /api/evaluations`. Scores are accepted as plain integers so out of
/// range values can be reported per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateEvaluationRequest {
	pub internship_id: String,
	/// Staff may evaluate on behalf of a tutor. Defaults to the caller.
	#[serde(default)]
	pub evaluator_id: Option<String>,
	#[serde(rename = "type")]
	pub evaluation_type: String,
	pub period_start: NaiveDate,
	pub period_end: NaiveDate,
	pub technical: i64,
	pub interpersonal: i64,
	pub autonomy: i64,
	pub punctuality: i64,
	pub motivation: i64,
	#[serde(default)]
	pub strengths: Option<String>,
	#[serde(default)]
	pub improvements: Option<String>,
	#[serde(default)]
	pub general_comment: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
}

/// `PUT /api/evaluations/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateEvaluationRequest {
	#[serde(rename = "type", default)]
	pub evaluation_type: Option<String>,
	#[serde(default)]
	pub period_start: Option<NaiveDate>,
	#[serde(default)]
	pub period_end: Option<NaiveDate>,
	#[serde(default)]
	pub technical: Option<i64>,
	#[serde(default)]
	pub interpersonal: Option<i64>,
	#[serde(default)]
	pub autonomy: Option<i64>,
	#[serde(default)]
	pub punctuality: Option<i64>,
	#[serde(default)]
	pub motivation: Option<i64>,
	#[serde(default)]
	pub strengths: Option<String>,
	#[serde(default)]
	pub improvements: Option<String>,
	#[serde(default)]
	pub general_comment: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EvaluationResponse {
	pub id: String,
	pub internship_id: String,
	pub intern_user_id: Option<String>,
	pub evaluator_id: String,
	#[serde(rename = "type")]
	pub evaluation_type: String,
	pub period_start: NaiveDate,
	pub period_end: NaiveDate,
	pub technical: u8,
	pub interpersonal: u8,
	pub autonomy: u8,
	pub punctuality: u8,
	pub motivation: u8,
	pub overall_score: f64,
	pub strengths: Option<String>,
	pub improvements: Option<String>,
	pub general_comment: Option<String>,
	pub status: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&Evaluation> for EvaluationResponse {
	fn from(e: &Evaluation) -> Self {
		Self {
			id: e.id.to_string(),
			internship_id: e.internship_id.to_string(),
			intern_user_id: e.intern_user_id.map(|u| u.to_string()),
			evaluator_id: e.evaluator_id.to_string(),
			evaluation_type: e.evaluation_type.to_string(),
			period_start: e.period_start,
			period_end: e.period_end,
			technical: e.scores.technical,
			interpersonal: e.scores.interpersonal,
			autonomy: e.scores.autonomy,
			punctuality: e.scores.punctuality,
			motivation: e.scores.motivation,
			overall_score: e.overall_score,
			strengths: e.strengths.clone(),
			improvements: e.improvements.clone(),
			general_comment: e.general_comment.clone(),
			status: e.status.to_string(),
			created_at: e.created_at,
			updated_at: e.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EvaluationStatsResponse {
	pub total: usize,
	pub average_score: Option<f64>,
	pub by_status: BTreeMap<String, usize>,
	pub by_type: BTreeMap<String, usize>,
	pub distribution: BTreeMap<String, usize>,
}

impl From<EvaluationStats> for EvaluationStatsResponse {
	fn from(s: EvaluationStats) -> Self {
		Self {
			total: s.total,
			average_score: s.average_score,
			by_status: s.by_status,
			by_type: s.by_type,
			distribution: s.distribution,
		}
	}
}
