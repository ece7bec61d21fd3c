// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Intern evaluations.
//!
//! Five component scores, each 0 to [`MAX_SCORE`], and a derived overall score equal
//! to their mean rounded to one decimal. The overall score is never accepted from
//! callers; it is recomputed on every change.
//!
//! Status may move freely between `draft` and `in_progress`. Once `finalized`, the
//! evaluation is immutable for everyone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stage_server_auth::{EvaluationId, InternshipId, ResourceAttrs, UserId};
use std::fmt;
use std::str::FromStr;

use crate::error::{FieldErrors, WorkflowError};

/// Upper bound of every component score.
pub const MAX_SCORE: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
	MidTerm,
	Final,
	#[serde(rename = "self")]
	SelfAssessment,
}

impl EvaluationType {
	pub fn all() -> &'static [EvaluationType] {
		&[
			EvaluationType::MidTerm,
			EvaluationType::Final,
			EvaluationType::SelfAssessment,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			EvaluationType::MidTerm => "mid_term",
			EvaluationType::Final => "final",
			EvaluationType::SelfAssessment => "self",
		}
	}
}

impl fmt::Display for EvaluationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EvaluationType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"mid_term" => Ok(EvaluationType::MidTerm),
			"final" => Ok(EvaluationType::Final),
			"self" => Ok(EvaluationType::SelfAssessment),
			other => Err(format!("unknown evaluation type: {other}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
	Draft,
	InProgress,
	Finalized,
}

impl EvaluationStatus {
	pub fn all() -> &'static [EvaluationStatus] {
		&[
			EvaluationStatus::Draft,
			EvaluationStatus::InProgress,
			EvaluationStatus::Finalized,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			EvaluationStatus::Draft => "draft",
			EvaluationStatus::InProgress => "in_progress",
			EvaluationStatus::Finalized => "finalized",
		}
	}
}

impl fmt::Display for EvaluationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EvaluationStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"draft" => Ok(EvaluationStatus::Draft),
			"in_progress" => Ok(EvaluationStatus::InProgress),
			"finalized" => Ok(EvaluationStatus::Finalized),
			other => Err(format!("unknown evaluation status: {other}")),
		}
	}
}

/// Component scores, each within `0..=MAX_SCORE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
	pub technical: u8,
	pub interpersonal: u8,
	pub autonomy: u8,
	pub punctuality: u8,
	pub motivation: u8,
}

impl Scores {
	/// Validate raw values. Every out-of-range field is reported.
	pub fn try_new(
		technical: i64,
		interpersonal: i64,
		autonomy: i64,
		punctuality: i64,
		motivation: i64,
	) -> Result<Self, WorkflowError> {
		let mut errors = FieldErrors::new();
		let mut check = |name: &str, value: i64| -> u8 {
			if (0..=MAX_SCORE).contains(&value) {
				value as u8
			} else {
				errors.add(name, format!("must be between 0 and {MAX_SCORE}"));
				0
			}
		};
		let scores = Scores {
			technical: check("technical", technical),
			interpersonal: check("interpersonal", interpersonal),
			autonomy: check("autonomy", autonomy),
			punctuality: check("punctuality", punctuality),
			motivation: check("motivation", motivation),
		};
		errors.into_result()?;
		Ok(scores)
	}

	pub fn values(&self) -> [u8; 5] {
		[
			self.technical,
			self.interpersonal,
			self.autonomy,
			self.punctuality,
			self.motivation,
		]
	}
}

/// Mean of the five components, rounded to one decimal.
pub fn overall_score(scores: &Scores) -> f64 {
	let sum: u32 = scores.values().iter().map(|v| u32::from(*v)).sum();
	round1(f64::from(sum) / 5.0)
}

pub(crate) fn round1(value: f64) -> f64 {
	(value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
	pub id: EvaluationId,
	pub internship_id: InternshipId,
	/// Owner of the internship, loaded alongside for policy checks.
	pub intern_user_id: Option<UserId>,
	pub evaluator_id: UserId,
	pub evaluation_type: EvaluationType,
	pub period_start: NaiveDate,
	pub period_end: NaiveDate,
	pub scores: Scores,
	pub overall_score: f64,
	pub strengths: Option<String>,
	pub improvements: Option<String>,
	pub general_comment: Option<String>,
	pub status: EvaluationStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Partial update. `None` leaves a field untouched; an empty comment clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPatch {
	pub evaluation_type: Option<EvaluationType>,
	pub period_start: Option<NaiveDate>,
	pub period_end: Option<NaiveDate>,
	pub technical: Option<i64>,
	pub interpersonal: Option<i64>,
	pub autonomy: Option<i64>,
	pub punctuality: Option<i64>,
	pub motivation: Option<i64>,
	pub strengths: Option<String>,
	pub improvements: Option<String>,
	pub general_comment: Option<String>,
	pub status: Option<EvaluationStatus>,
}

impl Evaluation {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		internship_id: InternshipId,
		intern_user_id: Option<UserId>,
		evaluator_id: UserId,
		evaluation_type: EvaluationType,
		period_start: NaiveDate,
		period_end: NaiveDate,
		scores: Scores,
		status: EvaluationStatus,
		now: DateTime<Utc>,
	) -> Result<Self, WorkflowError> {
		check_period(period_start, period_end)?;
		Ok(Self {
			id: EvaluationId::generate(),
			internship_id,
			intern_user_id,
			evaluator_id,
			evaluation_type,
			period_start,
			period_end,
			overall_score: overall_score(&scores),
			scores,
			strengths: None,
			improvements: None,
			general_comment: None,
			status,
			created_at: now,
			updated_at: now,
		})
	}

	pub fn with_comments(
		mut self,
		strengths: Option<String>,
		improvements: Option<String>,
		general_comment: Option<String>,
	) -> Self {
		self.strengths = clean(strengths);
		self.improvements = clean(improvements);
		self.general_comment = clean(general_comment);
		self
	}

	pub fn attrs(&self) -> ResourceAttrs {
		ResourceAttrs::evaluation(self.intern_user_id, self.evaluator_id)
	}

	pub fn is_finalized(&self) -> bool {
		self.status == EvaluationStatus::Finalized
	}

	/// Apply a patch, validating everything before mutating anything.
	pub fn apply(&mut self, patch: EvaluationPatch, now: DateTime<Utc>) -> Result<(), WorkflowError> {
		if self.is_finalized() {
			return Err(WorkflowError::EvaluationFinalized);
		}

		let scores = Scores::try_new(
			patch.technical.unwrap_or(i64::from(self.scores.technical)),
			patch.interpersonal.unwrap_or(i64::from(self.scores.interpersonal)),
			patch.autonomy.unwrap_or(i64::from(self.scores.autonomy)),
			patch.punctuality.unwrap_or(i64::from(self.scores.punctuality)),
			patch.motivation.unwrap_or(i64::from(self.scores.motivation)),
		)?;
		let period_start = patch.period_start.unwrap_or(self.period_start);
		let period_end = patch.period_end.unwrap_or(self.period_end);
		check_period(period_start, period_end)?;

		self.scores = scores;
		self.overall_score = overall_score(&scores);
		self.period_start = period_start;
		self.period_end = period_end;
		if let Some(t) = patch.evaluation_type {
			self.evaluation_type = t;
		}
		if let Some(s) = patch.strengths {
			self.strengths = clean(Some(s));
		}
		if let Some(s) = patch.improvements {
			self.improvements = clean(Some(s));
		}
		if let Some(s) = patch.general_comment {
			self.general_comment = clean(Some(s));
		}
		if let Some(status) = patch.status {
			self.status = status;
		}
		self.updated_at = now;
		Ok(())
	}
}

fn check_period(start: NaiveDate, end: NaiveDate) -> Result<(), WorkflowError> {
	if end < start {
		return Err(WorkflowError::field("period_end", "must not precede period_start"));
	}
	Ok(())
}

fn clean(text: Option<String>) -> Option<String> {
	text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
