// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and lifecycle rules for Stage.
//!
//! Everything in this crate is synchronous and storage-agnostic: the repositories in
//! `stage-server-db` persist these types, and the HTTP layer calls the rules here
//! after the access policy has allowed the operation.
//!
//! - [`request`]: the request state machine (`pending → approved | rejected`)
//! - [`evaluation`]: component scores, the derived overall score, and the
//!   finalized-is-immutable rule
//! - [`document`]: per-request document merging, file naming and content types
//! - [`assignment`]: tutor assignment strategies
//! - [`stats`]: evaluation statistics

pub mod assignment;
pub mod document;
pub mod error;
pub mod evaluation;
pub mod internship;
pub mod request;
pub mod stats;

pub use assignment::{LeastLoaded, TutorAssignmentStrategy, TutorLoad};
pub use document::{
	content_type_for, filter_visible, merge_request_documents, sanitize_file_name, storage_path,
	Document, DocumentView, LinkAnnotation, RequestDocumentLink,
};
pub use error::{FieldErrors, WorkflowError};
pub use evaluation::{
	overall_score, Evaluation, EvaluationPatch, EvaluationStatus, EvaluationType, Scores,
	MAX_SCORE,
};
pub use internship::{Internship, InternshipDefaults, InternshipStatus};
pub use request::{Decision, InternRequest, RequestStatus, RequestType};
pub use stats::EvaluationStats;
