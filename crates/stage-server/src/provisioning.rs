// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internship creation for newly provisioned interns.
//!
//! This is the second, best-effort half of user provisioning: the account
//! already exists when it runs, and any failure here is logged and reported as
//! "no internship" rather than undoing the account.

use chrono::{DateTime, Utc};
use stage_server_auth::Principal;
use stage_server_db::InternshipStore;
use stage_workflow_core::{Internship, InternshipDefaults, TutorAssignmentStrategy};

/// Create the default internship for `intern`, picking a tutor with `strategy`.
///
/// Returns `None` if any step fails. A failed tutor lookup still creates the
/// internship, without a tutor.
#[tracing::instrument(skip_all, fields(user_id = %intern.id, strategy = strategy.name()))]
pub async fn provision_internship(
	internships: &dyn InternshipStore,
	strategy: &dyn TutorAssignmentStrategy,
	defaults: &InternshipDefaults,
	intern: &Principal,
	now: DateTime<Utc>,
) -> Option<Internship> {
	let tutor_id = match internships.list_tutor_loads().await {
		Ok(loads) => strategy.choose(&loads),
		Err(e) => {
			tracing::warn!(error = %e, "could not load tutor workloads; creating internship without tutor");
			None
		}
	};

	let internship = defaults.build(intern.id, tutor_id, now);
	match internships.create_internship(&internship).await {
		Ok(()) => {
			tracing::info!(
				internship_id = %internship.id,
				tutor_id = ?internship.tutor_id,
				"internship provisioned"
			);
			Some(internship)
		}
		Err(e) => {
			tracing::warn!(error = %e, "internship creation failed; user kept without internship");
			None
		}
	}
}
