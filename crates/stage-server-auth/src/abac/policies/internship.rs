// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internship policies. Internships are created by provisioning, never through
//! the API, so only reads are granted.
//!
//! | Action | Granted to                                    |
//! |--------|-----------------------------------------------|
//! | Read   | admin, rh, supervising tutor, owning intern   |

use crate::abac::{Action, ResourceAttrs};
use crate::{Principal, Role};

pub fn evaluate(principal: &Principal, action: Action, resource: &ResourceAttrs) -> bool {
	match action {
		Action::Read => {
			principal.is_staff()
				|| (principal.role == Role::Tutor && resource.is_supervised_by(principal.id))
				|| (principal.role == Role::Intern && resource.is_owned_by(principal.id))
		}
		_ => false,
	}
}
