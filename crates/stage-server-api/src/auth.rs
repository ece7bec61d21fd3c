// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stage_server_auth::Principal;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginResponse {
	/// Signed bearer token. The session itself travels in the `stage_session` cookie.
	pub token: String,
	pub token_type: String,
	pub expires_at: DateTime<Utc>,
	pub user: UserResponse,
}

/// `PATCH /api/auth/me`. Absent fields are left unchanged; an empty string
/// clears an optional field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateProfileRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub phone: Option<String>,
	#[serde(default)]
	pub department: Option<String>,
	#[serde(default)]
	pub position: Option<String>,
	#[serde(default)]
	pub address: Option<String>,
}

impl UpdateProfileRequest {
	pub fn is_empty(&self) -> bool {
		self.name.is_none()
			&& self.phone.is_none()
			&& self.department.is_none()
			&& self.position.is_none()
			&& self.address.is_none()
	}
}

/// `POST /api/auth/password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChangePasswordRequest {
	pub current_password: String,
	pub new_password: String,
}

/// A user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserResponse {
	pub id: String,
	pub email: String,
	pub name: String,
	pub role: String,
	pub is_active: bool,
	pub phone: Option<String>,
	pub department: Option<String>,
	pub position: Option<String>,
	pub address: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&Principal> for UserResponse {
	fn from(p: &Principal) -> Self {
		Self {
			id: p.id.to_string(),
			email: p.email.clone(),
			name: p.name.clone(),
			role: p.role.to_string(),
			is_active: p.is_active,
			phone: p.phone.clone(),
			department: p.department.clone(),
			position: p.position.clone(),
			address: p.address.clone(),
			created_at: p.created_at,
			updated_at: p.updated_at,
		}
	}
}
