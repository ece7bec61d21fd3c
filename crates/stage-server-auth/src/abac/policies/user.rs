// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User directory policies.

use crate::abac::{Action, ResourceAttrs};
use crate::Principal;

/// Everyone may read and update their own profile (contact details, not role
/// or status). Everything else on users is admin-only.
pub fn evaluate(principal: &Principal, action: Action, resource: &ResourceAttrs) -> bool {
	match action {
		Action::Read | Action::Update if resource.is_owned_by(principal.id) => true,
		Action::Read | Action::ManageUsers | Action::Create | Action::Update => {
			principal.is_admin()
		}
		_ => false,
	}
}
