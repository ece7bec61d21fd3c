// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tutor assignment for newly provisioned interns.

use stage_server_auth::UserId;

/// A candidate tutor and the number of internships they currently supervise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorLoad {
	pub tutor_id: UserId,
	pub current_interns: u32,
}

impl TutorLoad {
	pub fn new(tutor_id: UserId, current_interns: u32) -> Self {
		Self {
			tutor_id,
			current_interns,
		}
	}
}

/// Picks a tutor for a new intern among active tutors.
///
/// Implementations receive candidates in a stable order (oldest account first)
/// and return `None` when nobody fits, in which case the internship is created
/// without a tutor.
pub trait TutorAssignmentStrategy: Send + Sync {
	fn name(&self) -> &'static str;

	fn choose(&self, candidates: &[TutorLoad]) -> Option<UserId>;
}

/// The tutor with the fewest current interns. Ties go to the earliest candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastLoaded;

impl TutorAssignmentStrategy for LeastLoaded {
	fn name(&self) -> &'static str {
		"least_loaded"
	}

	fn choose(&self, candidates: &[TutorLoad]) -> Option<UserId> {
		// min_by_key returns the first minimum, which gives the tie rule.
		candidates
			.iter()
			.min_by_key(|c| c.current_interns)
			.map(|c| c.tutor_id)
	}
}
