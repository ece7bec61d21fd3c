// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ApiResponse<T> {
	pub success: bool,
	pub data: T,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Row count for collection listings.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
	pub fn ok(data: T) -> Self {
		Self {
			success: true,
			data,
			message: None,
			total: None,
		}
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}
}

impl<T> ApiResponse<Vec<T>> {
	/// A listing with `total` set to its length.
	pub fn list(data: Vec<T>) -> Self {
		let total = data.len();
		Self {
			total: Some(total),
			..Self::ok(data)
		}
	}
}

/// Error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
	pub success: bool,
	/// Stable machine-readable code such as `forbidden` or `validation_error`.
	pub error: String,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			success: false,
			error: error.into(),
			message: message.into(),
			fields: None,
		}
	}

	pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
		if !fields.is_empty() {
			self.fields = Some(fields);
		}
		self
	}
}
