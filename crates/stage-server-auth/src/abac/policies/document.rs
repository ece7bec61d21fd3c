// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document policies.

use crate::abac::{Action, ResourceAttrs};
use crate::Principal;

/// Read and download: owner, public, or staff. Upload is open to any active
/// principal (the uploader becomes the owner). Documents are never deleted.
pub fn evaluate(principal: &Principal, action: Action, resource: &ResourceAttrs) -> bool {
	let is_owner = resource.is_owned_by(principal.id);

	match action {
		Action::Read | Action::Download => is_owner || resource.is_public || principal.is_staff(),
		Action::Create => true,
		_ => false,
	}
}
