// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod bootstrap;
pub mod documents;
pub mod evaluations;
pub mod health;
pub mod internships;
pub mod requests;

use stage_server_auth::{can_access, Action, Principal, ResourceAttrs};
use stage_server_db::AuditEntry;

use crate::{api::AppState, error::ServerError};

/// Ask the policy about one addressed resource; a denial is a 403.
pub(crate) fn authorize(
	principal: &Principal,
	action: Action,
	resource: &ResourceAttrs,
) -> Result<(), ServerError> {
	if can_access(principal, action, resource) {
		return Ok(());
	}
	tracing::warn!(
		user_id = %principal.id,
		role = %principal.role,
		action = ?action,
		resource_type = ?resource.resource_type,
		"access denied"
	);
	Err(ServerError::Forbidden(format!(
		"{} may not perform {action:?} on this {:?}",
		principal.role, resource.resource_type
	)))
}

/// Audit writes never fail the operation they describe.
pub(crate) async fn record_audit(state: &AppState, entry: AuditEntry) {
	if let Err(e) = state.audit_repo.record(&entry).await {
		tracing::error!(error = %e, event_type = entry.event_type.as_str(), "failed to write audit entry");
	}
}
