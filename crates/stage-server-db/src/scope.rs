// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stage_server_auth::{Principal, Role, UserId};

/// Narrows a collection query to the rows a role can possibly see. The access
/// policy still runs on every returned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
	/// Staff: every row.
	All,
	/// Rows supervised (requests) or authored (evaluations) by this tutor.
	Tutor(UserId),
	/// Rows on internships owned by this intern.
	Intern(UserId),
}

impl ListScope {
	pub fn for_principal(principal: &Principal) -> Self {
		match principal.role {
			Role::Admin | Role::Rh => ListScope::All,
			Role::Tutor => ListScope::Tutor(principal.id),
			Role::Intern => ListScope::Intern(principal.id),
		}
	}
}
