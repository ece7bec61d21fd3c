// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::auth::UserResponse;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// `POST /api/bootstrap/admin`, authenticated by the `X-Bootstrap-Token` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BootstrapAdminRequest {
	pub email: String,
	pub name: String,
	/// Sets the password when present; an existing password is kept otherwise.
	#[serde(default)]
	pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BootstrapAdminResponse {
	pub user: UserResponse,
	/// False when an existing account was promoted.
	pub created: bool,
}
