// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for policy evaluation.
//!
//! Attributes are computed by the caller before evaluation. Policy functions are
//! pure and never reach the database.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Operation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Read,
	Create,
	Update,
	Delete,
	/// Approve or reject a request.
	WriteStatus,
	/// Leave a response comment on a request without changing its status.
	Comment,
	/// Declare the required-document checklist of a request.
	AttachDocuments,
	/// List the documents linked to a request.
	ListDocuments,
	/// Download the bytes of a document.
	Download,
	/// Aggregate evaluation statistics.
	ViewStats,
	/// Create, list and update user accounts.
	ManageUsers,
}

/// Kind of resource being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	Request,
	Document,
	Evaluation,
	Internship,
	User,
}

/// Attributes describing the resource being accessed.
///
/// `owner_user_id` is the intern who owns the internship for internships,
/// requests and evaluations, and the uploader for documents. `supervisor_id` is
/// the assigned tutor for internships and requests and the evaluator for
/// evaluations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAttrs {
	pub resource_type: ResourceType,
	pub owner_user_id: Option<UserId>,
	pub supervisor_id: Option<UserId>,
	pub is_public: bool,
}

impl ResourceAttrs {
	/// A request owned by the intern `intern_user_id`, optionally supervised by a tutor.
	pub fn request(intern_user_id: UserId, tutor_id: Option<UserId>) -> Self {
		Self {
			resource_type: ResourceType::Request,
			owner_user_id: Some(intern_user_id),
			supervisor_id: tutor_id,
			is_public: false,
		}
	}

	/// A document uploaded by `owner_id`.
	pub fn document(owner_id: UserId, is_public: bool) -> Self {
		Self {
			resource_type: ResourceType::Document,
			owner_user_id: Some(owner_id),
			supervisor_id: None,
			is_public,
		}
	}

	/// An evaluation of the intern `intern_user_id` written by `evaluator_id`.
	///
	/// The intern may be unknown when the internship row has gone missing; such an
	/// evaluation is then visible to staff and its evaluator only.
	pub fn evaluation(intern_user_id: Option<UserId>, evaluator_id: UserId) -> Self {
		Self {
			resource_type: ResourceType::Evaluation,
			owner_user_id: intern_user_id,
			supervisor_id: Some(evaluator_id),
			is_public: false,
		}
	}

	/// The evaluation collection, for create and statistics checks.
	pub fn evaluations() -> Self {
		Self {
			resource_type: ResourceType::Evaluation,
			owner_user_id: None,
			supervisor_id: None,
			is_public: false,
		}
	}

	/// The internship of `intern_user_id`, optionally supervised by a tutor.
	pub fn internship(intern_user_id: UserId, tutor_id: Option<UserId>) -> Self {
		Self {
			resource_type: ResourceType::Internship,
			owner_user_id: Some(intern_user_id),
			supervisor_id: tutor_id,
			is_public: false,
		}
	}

	/// The user directory, or one user when `target` is set.
	pub fn user(target: Option<UserId>) -> Self {
		Self {
			resource_type: ResourceType::User,
			owner_user_id: target,
			supervisor_id: None,
			is_public: false,
		}
	}

	pub fn is_owned_by(&self, user_id: UserId) -> bool {
		self.owner_user_id == Some(user_id)
	}

	pub fn is_supervised_by(&self, user_id: UserId) -> bool {
		self.supervisor_id == Some(user_id)
	}
}
