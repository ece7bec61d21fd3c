// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Intern requests and their status lifecycle.
//!
//! ```text
//!            ┌──────────► approved
//! pending ───┤
//!            └──────────► rejected
//! ```
//!
//! Both outcomes are terminal. Every decision stamps `responded_at`, with or
//! without a response comment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stage_server_auth::{InternshipId, RequestId, ResourceAttrs, UserId};
use std::fmt;
use std::str::FromStr;

use crate::error::{FieldErrors, WorkflowError};

/// Longest accepted description or response comment, in characters.
pub const MAX_TEXT_LEN: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
	Leave,
	Extension,
	TutorChange,
	Modification,
}

impl RequestType {
	pub fn as_str(&self) -> &'static str {
		match self {
			RequestType::Leave => "leave",
			RequestType::Extension => "extension",
			RequestType::TutorChange => "tutor_change",
			RequestType::Modification => "modification",
		}
	}
}

impl fmt::Display for RequestType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RequestType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"leave" => Ok(RequestType::Leave),
			"extension" => Ok(RequestType::Extension),
			"tutor_change" => Ok(RequestType::TutorChange),
			"modification" => Ok(RequestType::Modification),
			other => Err(format!("unknown request type: {other}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
	Pending,
	Approved,
	Rejected,
}

impl RequestStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			RequestStatus::Pending => "pending",
			RequestStatus::Approved => "approved",
			RequestStatus::Rejected => "rejected",
		}
	}

	pub fn is_terminal(&self) -> bool {
		!matches!(self, RequestStatus::Pending)
	}

	pub fn can_transition_to(&self, target: RequestStatus) -> bool {
		matches!(
			(self, target),
			(
				RequestStatus::Pending,
				RequestStatus::Approved | RequestStatus::Rejected
			)
		)
	}
}

impl fmt::Display for RequestStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RequestStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(RequestStatus::Pending),
			"approved" => Ok(RequestStatus::Approved),
			"rejected" => Ok(RequestStatus::Rejected),
			other => Err(format!("unknown request status: {other}")),
		}
	}
}

/// A request submitted by an intern.
///
/// `intern_user_id` is the owner of `internship_id`, denormalized on load so the
/// access policy can be evaluated without another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternRequest {
	pub id: RequestId,
	pub request_type: RequestType,
	pub status: RequestStatus,
	pub internship_id: InternshipId,
	pub intern_user_id: UserId,
	pub tutor_id: Option<UserId>,
	pub description: String,
	pub response_comment: Option<String>,
	pub created_at: DateTime<Utc>,
	pub responded_at: Option<DateTime<Utc>>,
}

/// The outcome of a status transition, to be persisted as one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
	pub from: RequestStatus,
	pub status: RequestStatus,
	pub response_comment: Option<String>,
	pub responded_at: DateTime<Utc>,
}

impl InternRequest {
	pub fn attrs(&self) -> ResourceAttrs {
		ResourceAttrs::request(self.intern_user_id, self.tutor_id)
	}

	/// A new pending request on `internship_id`.
	pub fn new(
		request_type: RequestType,
		internship_id: InternshipId,
		intern_user_id: UserId,
		tutor_id: Option<UserId>,
		description: String,
		now: DateTime<Utc>,
	) -> Result<Self, WorkflowError> {
		let description = validate_text("description", &description, true)?;
		Ok(Self {
			id: RequestId::generate(),
			request_type,
			status: RequestStatus::Pending,
			internship_id,
			intern_user_id,
			tutor_id,
			description,
			response_comment: None,
			created_at: now,
			responded_at: None,
		})
	}

	/// Validate a transition to `target` and produce the update to persist.
	///
	/// A blank comment is treated as no comment. An existing comment is kept when
	/// none is supplied.
	pub fn decide(
		&self,
		target: RequestStatus,
		comment: Option<&str>,
		now: DateTime<Utc>,
	) -> Result<Decision, WorkflowError> {
		if !self.status.can_transition_to(target) {
			return Err(WorkflowError::InvalidTransition {
				from: self.status,
				to: target,
			});
		}
		let comment = normalize_comment(comment)?.or_else(|| self.response_comment.clone());
		Ok(Decision {
			from: self.status,
			status: target,
			response_comment: comment,
			responded_at: now,
		})
	}
}

/// Trim a comment; blank becomes `None`. Over-long comments are rejected.
pub fn normalize_comment(comment: Option<&str>) -> Result<Option<String>, WorkflowError> {
	match comment.map(str::trim) {
		None | Some("") => Ok(None),
		Some(text) => validate_text("comment", text, true).map(Some),
	}
}

fn validate_text(field: &str, text: &str, required: bool) -> Result<String, WorkflowError> {
	let trimmed = text.trim();
	let mut errors = FieldErrors::new();
	if required && trimmed.is_empty() {
		errors.add(field, "must not be empty");
	} else if trimmed.chars().count() > MAX_TEXT_LEN {
		errors.add(field, format!("must be at most {MAX_TEXT_LEN} characters"));
	}
	errors.into_result()?;
	Ok(trimmed.to_string())
}
