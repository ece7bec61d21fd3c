// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internship assignments binding an intern to a placement and a tutor.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stage_server_auth::{InternshipId, ResourceAttrs, UserId};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
	Active,
	Completed,
	Terminated,
}

impl InternshipStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			InternshipStatus::Active => "active",
			InternshipStatus::Completed => "completed",
			InternshipStatus::Terminated => "terminated",
		}
	}
}

impl fmt::Display for InternshipStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for InternshipStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"active" => Ok(InternshipStatus::Active),
			"completed" => Ok(InternshipStatus::Completed),
			"terminated" => Ok(InternshipStatus::Terminated),
			other => Err(format!("unknown internship status: {other}")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internship {
	pub id: InternshipId,
	pub user_id: UserId,
	pub company_name: String,
	pub position: String,
	pub tutor_id: Option<UserId>,
	pub status: InternshipStatus,
	pub start_date: NaiveDate,
	pub end_date: NaiveDate,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Internship {
	pub fn attrs(&self) -> ResourceAttrs {
		ResourceAttrs::internship(self.user_id, self.tutor_id)
	}
}

/// Placement values used when an intern account is provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternshipDefaults {
	pub company_name: String,
	pub position: String,
	pub duration_days: u32,
}

impl Default for InternshipDefaults {
	fn default() -> Self {
		Self {
			company_name: "Bridge Technologies Solutions".to_string(),
			position: "Intern".to_string(),
			duration_days: 180,
		}
	}
}

impl InternshipDefaults {
	/// A new active internship for `user_id` starting on `today`.
	pub fn build(&self, user_id: UserId, tutor_id: Option<UserId>, now: DateTime<Utc>) -> Internship {
		let start_date = now.date_naive();
		Internship {
			id: InternshipId::generate(),
			user_id,
			company_name: self.company_name.clone(),
			position: self.position.clone(),
			tutor_id,
			status: InternshipStatus::Active,
			start_date,
			end_date: start_date + Duration::days(i64::from(self.duration_days)),
			created_at: now,
			updated_at: now,
		}
	}
}
