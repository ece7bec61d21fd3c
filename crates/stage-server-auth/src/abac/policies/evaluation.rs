// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Evaluation policies.

use crate::abac::{Action, ResourceAttrs};
use crate::{Principal, Role};

pub fn evaluate(principal: &Principal, action: Action, resource: &ResourceAttrs) -> bool {
	let is_evaluator = principal.role == Role::Tutor && resource.is_supervised_by(principal.id);
	let is_evaluated_intern =
		principal.role == Role::Intern && resource.is_owned_by(principal.id);

	match action {
		Action::Read => principal.is_staff() || is_evaluator || is_evaluated_intern,
		Action::Create => principal.is_staff() || principal.role == Role::Tutor,
		Action::Update => principal.is_staff() || is_evaluator,
		Action::Delete | Action::ViewStats => principal.is_staff(),
		_ => false,
	}
}
