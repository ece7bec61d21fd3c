// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for every stored entity
//!   ([`UserId`], [`InternshipId`], [`RequestId`], ...) so a request id can never be
//!   passed where a document id is expected
//! - **Role**: the four application roles ([`Role`])
//! - **Principal**: the loaded profile of the caller ([`Principal`])

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Uuid::parse_str(s).map(Self)
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user (principal).");
define_id_type!(SessionId, "Unique identifier for a login session.");
define_id_type!(InternshipId, "Unique identifier for an internship assignment.");
define_id_type!(RequestId, "Unique identifier for an intern request.");
define_id_type!(DocumentId, "Unique identifier for an uploaded document.");
define_id_type!(LinkId, "Unique identifier for a request/document checklist row.");
define_id_type!(EvaluationId, "Unique identifier for an evaluation.");
define_id_type!(AuditId, "Unique identifier for an audit log entry.");

// =============================================================================
// Roles
// =============================================================================

/// Application roles. Stored in the profile store, which is the only authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Manages users and has full read/write access.
	Admin,
	/// Human resources staff; same data access as admin, no user management.
	Rh,
	/// Supervises the interns assigned to them.
	Tutor,
	/// Submits requests and uploads documents for their own internship.
	Intern,
}

impl Role {
	/// Returns all roles.
	pub fn all() -> &'static [Role] {
		&[Role::Admin, Role::Rh, Role::Tutor, Role::Intern]
	}

	/// Admin and HR see every record.
	pub fn is_staff(&self) -> bool {
		matches!(self, Role::Admin | Role::Rh)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Rh => "rh",
			Role::Tutor => "tutor",
			Role::Intern => "intern",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(Role::Admin),
			"rh" => Ok(Role::Rh),
			"tutor" => Ok(Role::Tutor),
			"intern" => Ok(Role::Intern),
			other => Err(format!("unknown role: {other}")),
		}
	}
}

// =============================================================================
// Principal
// =============================================================================

/// A user profile as stored in the `users` table.
///
/// Once loaded for the caller of a request this is the principal that every policy
/// and lifecycle call receives explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	pub id: UserId,
	pub email: String,
	pub name: String,
	pub role: Role,
	pub is_active: bool,
	pub phone: Option<String>,
	pub department: Option<String>,
	pub position: Option<String>,
	pub address: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Principal {
	/// Build a principal with only the required fields set. Mostly for fixtures.
	pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			email: email.into(),
			name: name.into(),
			role,
			is_active: true,
			phone: None,
			department: None,
			position: None,
			address: None,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}

	pub fn is_staff(&self) -> bool {
		self.role.is_staff()
	}
}
