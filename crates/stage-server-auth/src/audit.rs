// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit event types for security-relevant administrative actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Events written to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	/// An admin was created or promoted through bootstrap provisioning.
	BootstrapAdminProvisioned,
	/// A bootstrap provisioning attempt was refused.
	BootstrapAdminRejected,
	/// An admin created a user account.
	UserCreated,
	/// An admin changed a user's role.
	RoleChanged,
	/// An admin activated or deactivated a user.
	ActiveChanged,
	/// A request was approved or rejected.
	RequestDecided,
	/// A user changed their own password.
	PasswordChanged,
}

impl AuditEventType {
	pub fn as_str(&self) -> &'static str {
		match self {
			AuditEventType::BootstrapAdminProvisioned => "bootstrap_admin_provisioned",
			AuditEventType::BootstrapAdminRejected => "bootstrap_admin_rejected",
			AuditEventType::UserCreated => "user_created",
			AuditEventType::RoleChanged => "role_changed",
			AuditEventType::ActiveChanged => "active_changed",
			AuditEventType::RequestDecided => "request_decided",
			AuditEventType::PasswordChanged => "password_changed",
		}
	}
}

impl fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for AuditEventType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"bootstrap_admin_provisioned" => Ok(AuditEventType::BootstrapAdminProvisioned),
			"bootstrap_admin_rejected" => Ok(AuditEventType::BootstrapAdminRejected),
			"user_created" => Ok(AuditEventType::UserCreated),
			"role_changed" => Ok(AuditEventType::RoleChanged),
			"active_changed" => Ok(AuditEventType::ActiveChanged),
			"request_decided" => Ok(AuditEventType::RequestDecided),
			"password_changed" => Ok(AuditEventType::PasswordChanged),
			other => Err(format!("unknown audit event type: {other}")),
		}
	}
}
