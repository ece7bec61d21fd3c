// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared validation utilities for API handlers.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use stage_server_auth::MIN_PASSWORD_LEN;
use stage_workflow_core::FieldErrors;

use crate::error::ServerError;

static EMAIL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const MIN_NAME_LEN: usize = 2;

/// Sanitize an email address by trimming whitespace and lowercasing.
pub fn sanitize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
	EMAIL_REGEX.is_match(email)
}

/// Trim an optional text field; blank becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse a path or body identifier. Malformed ids are a validation error on
/// `field`.
pub fn parse_id<T: FromStr>(value: &str, field: &str) -> Result<T, ServerError> {
	value
		.trim()
		.parse()
		.map_err(|_| ServerError::field(field, "must be a valid id"))
}

/// Parse one of a closed set of names (role, status, type).
pub fn parse_enum<T: FromStr<Err = String>>(value: &str, field: &str) -> Result<T, ServerError> {
	value.trim().parse().map_err(|e: String| ServerError::field(field, e))
}

/// Account fields checked together so the caller sees every problem at once.
/// `email` must already be sanitized.
pub fn check_account(email: &str, name: &str, password: Option<&str>) -> FieldErrors {
	let mut errors = FieldErrors::new();
	if !is_valid_email(email) {
		errors.add("email", "must be a valid email address");
	}
	if name.trim().chars().count() < MIN_NAME_LEN {
		errors.add("name", format!("must be at least {MIN_NAME_LEN} characters"));
	}
	if let Some(password) = password {
		if password.chars().count() < MIN_PASSWORD_LEN {
			errors.add(
				"password",
				format!("must be at least {MIN_PASSWORD_LEN} characters"),
			);
		}
	}
	errors
}
