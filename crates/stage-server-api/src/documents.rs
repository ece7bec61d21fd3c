// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stage_workflow_core::{Document, DocumentView};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Document metadata. `required_document_type` and `mandatory` are set only in
/// per-request listings, for documents reached through a checklist link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DocumentResponse {
	pub id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub mime_type: String,
	pub size_bytes: i64,
	pub owner_id: String,
	pub request_id: Option<String>,
	pub is_public: bool,
	pub created_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub required_document_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mandatory: Option<bool>,
}

impl From<&Document> for DocumentResponse {
	fn from(d: &Document) -> Self {
		Self {
			id: d.id.to_string(),
			name: d.name.clone(),
			kind: d.kind.clone(),
			mime_type: d.content_type().to_string(),
			size_bytes: d.size_bytes,
			owner_id: d.owner_id.to_string(),
			request_id: d.request_id.map(|r| r.to_string()),
			is_public: d.is_public,
			created_at: d.created_at,
			required_document_type: None,
			mandatory: None,
		}
	}
}

impl From<&DocumentView> for DocumentResponse {
	fn from(view: &DocumentView) -> Self {
		let mut response = DocumentResponse::from(&view.document);
		if let Some(link) = &view.link {
			response.required_document_type = Some(link.required_document_type.clone());
			response.mandatory = Some(link.mandatory);
		}
		response
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UploadDocumentResponse {
	pub document: DocumentResponse,
	pub storage_path: String,
}
