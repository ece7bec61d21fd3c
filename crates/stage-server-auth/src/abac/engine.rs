// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy evaluation entry point.
//!
//! Deny is the default. Every policy module lists positive grants only, and an
//! inactive principal is denied before any policy runs, whatever their role.

use tracing::instrument;

use super::policies::{document, evaluation, internship, request, user};
use super::types::{Action, ResourceAttrs, ResourceType};
use crate::Principal;

/// Evaluates whether `principal` may perform `action` on `resource`.
#[instrument(
    level = "debug",
    skip(principal, resource),
    fields(
        user_id = %principal.id,
        role = %principal.role,
        action = ?action,
        resource_type = ?resource.resource_type,
    )
)]
pub fn can_access(principal: &Principal, action: Action, resource: &ResourceAttrs) -> bool {
	if !principal.is_active {
		return false;
	}

	match resource.resource_type {
		ResourceType::Request => request::evaluate(principal, action, resource),
		ResourceType::Document => document::evaluate(principal, action, resource),
		ResourceType::Evaluation => evaluation::evaluate(principal, action, resource),
		ResourceType::Internship => internship::evaluate(principal, action, resource),
		ResourceType::User => user::evaluate(principal, action, resource),
	}
}
