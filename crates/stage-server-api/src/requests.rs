// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stage_workflow_core::{InternRequest, RequestDocumentLink};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// `POST /api/requests`. Without `internship_id` the caller's current
/// internship is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateRequestRequest {
	#[serde(rename = "type")]
	pub request_type: String,
	pub description: String,
	#[serde(default)]
	pub internship_id: Option<String>,
}

/// `PUT /api/requests/{id}`. A `status` decides the request; a comment alone
/// only annotates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateRequestRequest {
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub response_comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RequiredDocumentEntry {
	/// Required document type. Mandatory on every entry.
	#[serde(rename = "type", default)]
	pub document_type: Option<String>,
	#[serde(default)]
	pub document_id: Option<String>,
	#[serde(default)]
	pub mandatory: Option<bool>,
}

/// `POST /api/requests/{id}/documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AttachDocumentsRequest {
	pub documents: Vec<RequiredDocumentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RequestResponse {
	pub id: String,
	#[serde(rename = "type")]
	pub request_type: String,
	pub status: String,
	pub internship_id: String,
	pub intern_user_id: String,
	pub tutor_id: Option<String>,
	pub description: String,
	pub response_comment: Option<String>,
	pub created_at: DateTime<Utc>,
	pub responded_at: Option<DateTime<Utc>>,
}

impl From<&InternRequest> for RequestResponse {
	fn from(r: &InternRequest) -> Self {
		Self {
			id: r.id.to_string(),
			request_type: r.request_type.to_string(),
			status: r.status.to_string(),
			internship_id: r.internship_id.to_string(),
			intern_user_id: r.intern_user_id.to_string(),
			tutor_id: r.tutor_id.map(|t| t.to_string()),
			description: r.description.clone(),
			response_comment: r.response_comment.clone(),
			created_at: r.created_at,
			responded_at: r.responded_at,
		}
	}
}

/// One row of a request's required-document checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RequestDocumentLinkResponse {
	pub id: String,
	pub request_id: String,
	pub document_id: Option<String>,
	#[serde(rename = "type")]
	pub required_document_type: String,
	pub mandatory: bool,
	pub created_at: DateTime<Utc>,
}

impl From<&RequestDocumentLink> for RequestDocumentLinkResponse {
	fn from(link: &RequestDocumentLink) -> Self {
		Self {
			id: link.id.to_string(),
			request_id: link.request_id.to_string(),
			document_id: link.document_id.map(|d| d.to_string()),
			required_document_type: link.required_document_type.clone(),
			mandatory: link.mandatory,
			created_at: link.created_at,
		}
	}
}
