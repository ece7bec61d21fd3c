// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Intern request policies.
//!
//! | Action          | Granted to                                   |
//! |-----------------|----------------------------------------------|
//! | Read            | admin, rh, assigned tutor, owning intern     |
//! | ListDocuments   | same as Read                                 |
//! | Create          | owning intern                                |
//! | AttachDocuments | owning intern                                |
//! | WriteStatus     | admin, rh                                    |
//! | Comment         | admin, rh, assigned tutor                    |

use crate::abac::{Action, ResourceAttrs};
use crate::{Principal, Role};

pub fn evaluate(principal: &Principal, action: Action, resource: &ResourceAttrs) -> bool {
	let is_owning_intern = principal.role == Role::Intern && resource.is_owned_by(principal.id);
	let is_assigned_tutor =
		principal.role == Role::Tutor && resource.is_supervised_by(principal.id);

	match action {
		Action::Read | Action::ListDocuments => {
			principal.is_staff() || is_assigned_tutor || is_owning_intern
		}
		Action::Create | Action::AttachDocuments => is_owning_intern,
		Action::WriteStatus => principal.is_staff(),
		Action::Comment => principal.is_staff() || is_assigned_tutor,
		_ => false,
	}
}
