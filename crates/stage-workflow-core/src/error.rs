// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::request::RequestStatus;

/// Field name → message, ordered so responses are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.entry(field.into()).or_insert_with(|| message.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, field: &str) -> Option<&str> {
		self.0.get(field).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn into_inner(self) -> BTreeMap<String, String> {
		self.0
	}

	/// `Ok(())` when empty, otherwise a validation error carrying every field.
	pub fn into_result(self) -> Result<(), WorkflowError> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(WorkflowError::Validation(self))
		}
	}
}

impl fmt::Display for FieldErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for (field, message) in &self.0 {
			if !first {
				f.write_str("; ")?;
			}
			write!(f, "{field}: {message}")?;
			first = false;
		}
		Ok(())
	}
}

/// Lifecycle and input errors. All of these are client errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
	#[error("invalid status transition from {from} to {to}")]
	InvalidTransition { from: RequestStatus, to: RequestStatus },

	#[error("evaluation is finalized and can no longer be edited")]
	EvaluationFinalized,

	#[error("validation failed: {0}")]
	Validation(FieldErrors),
}

impl WorkflowError {
	/// Single-field validation error.
	pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
		let mut errors = FieldErrors::new();
		errors.add(field, message);
		WorkflowError::Validation(errors)
	}

	pub fn code(&self) -> &'static str {
		match self {
			WorkflowError::InvalidTransition { .. } => "invalid_transition",
			WorkflowError::EvaluationFinalized => "evaluation_finalized",
			WorkflowError::Validation(_) => "validation_error",
		}
	}
}
