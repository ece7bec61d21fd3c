// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stage_workflow_core::Internship;

use crate::auth::UserResponse;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

fn default_true() -> bool {
	true
}

/// `POST /api/admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateUserRequest {
	pub email: String,
	pub password: String,
	pub name: String,
	pub role: String,
	#[serde(default)]
	pub phone: Option<String>,
	#[serde(default)]
	pub department: Option<String>,
	#[serde(default)]
	pub position: Option<String>,
	#[serde(default)]
	pub address: Option<String>,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

/// `PATCH /api/admin/users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateUserRequest {
	#[serde(default)]
	pub role: Option<String>,
	#[serde(default)]
	pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct InternshipResponse {
	pub id: String,
	pub user_id: String,
	pub company_name: String,
	pub position: String,
	pub tutor_id: Option<String>,
	pub status: String,
	pub start_date: NaiveDate,
	pub end_date: NaiveDate,
	pub created_at: DateTime<Utc>,
}

impl From<&Internship> for InternshipResponse {
	fn from(i: &Internship) -> Self {
		Self {
			id: i.id.to_string(),
			user_id: i.user_id.to_string(),
			company_name: i.company_name.clone(),
			position: i.position.clone(),
			tutor_id: i.tutor_id.map(|t| t.to_string()),
			status: i.status.to_string(),
			start_date: i.start_date,
			end_date: i.end_date,
			created_at: i.created_at,
		}
	}
}

/// The created user and, for interns, their internship. `internship` is null
/// when the account is not an intern or the internship could not be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateUserResponse {
	pub user: UserResponse,
	pub internship: Option<InternshipResponse>,
}
