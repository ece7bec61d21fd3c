// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Documents and the document visibility filter.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stage_server_auth::{
	can_access, Action, DocumentId, LinkId, Principal, RequestId, ResourceAttrs, UserId,
};

/// Metadata of an uploaded file. The bytes live in the blob store at `storage_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	pub id: DocumentId,
	pub name: String,
	/// Business category (`document`, `convention`, `report`, ...).
	pub kind: String,
	pub mime_type: Option<String>,
	pub size_bytes: i64,
	pub storage_path: String,
	pub owner_id: UserId,
	pub request_id: Option<RequestId>,
	pub is_public: bool,
	pub created_at: DateTime<Utc>,
}

impl Document {
	pub fn attrs(&self) -> ResourceAttrs {
		ResourceAttrs::document(self.owner_id, self.is_public)
	}

	/// Stored MIME type, else one derived from the file extension.
	pub fn content_type(&self) -> &str {
		match self.mime_type.as_deref() {
			Some(mime) if !mime.is_empty() => mime,
			_ => content_type_for(&self.name),
		}
	}
}

/// A checklist row declaring that a request needs a document of some type,
/// optionally pointing at the uploaded document that satisfies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDocumentLink {
	pub id: LinkId,
	pub request_id: RequestId,
	pub document_id: Option<DocumentId>,
	pub required_document_type: String,
	pub mandatory: bool,
	pub created_at: DateTime<Utc>,
}

impl RequestDocumentLink {
	pub fn annotation(&self) -> LinkAnnotation {
		LinkAnnotation {
			required_document_type: self.required_document_type.clone(),
			mandatory: self.mandatory,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAnnotation {
	pub required_document_type: String,
	pub mandatory: bool,
}

/// A document as listed for a request: linked documents carry their checklist
/// annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentView {
	pub document: Document,
	pub link: Option<LinkAnnotation>,
}

/// Merge documents tagged directly with a request and documents reached through
/// its checklist links.
///
/// One entry per document id. When a document appears both ways the linked
/// variant wins; when it is linked more than once a mandatory link wins over an
/// optional one. Result is newest first, ties broken by id.
pub fn merge_request_documents(
	direct: Vec<Document>,
	linked: Vec<(Document, LinkAnnotation)>,
) -> Vec<DocumentView> {
	let mut merged: HashMap<DocumentId, DocumentView> = HashMap::new();

	for document in direct {
		merged
			.entry(document.id)
			.or_insert(DocumentView { document, link: None });
	}

	for (document, annotation) in linked {
		match merged.get_mut(&document.id) {
			Some(view) => {
				let replace = match &view.link {
					None => true,
					Some(existing) => annotation.mandatory && !existing.mandatory,
				};
				if replace {
					view.link = Some(annotation);
				}
			}
			None => {
				merged.insert(
					document.id,
					DocumentView {
						document,
						link: Some(annotation),
					},
				);
			}
		}
	}

	let mut views: Vec<DocumentView> = merged.into_values().collect();
	views.sort_by(|a, b| {
		b.document
			.created_at
			.cmp(&a.document.created_at)
			.then_with(|| a.document.id.cmp(&b.document.id))
	});
	views
}

/// Keep only the documents `principal` may read, preserving order.
pub fn filter_visible(principal: &Principal, documents: Vec<Document>) -> Vec<Document> {
	documents
		.into_iter()
		.filter(|d| can_access(principal, Action::Read, &d.attrs()))
		.collect()
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
///
/// Names made only of dots (or empty) become `file` so the result can never be a
/// path component like `..`.
pub fn sanitize_file_name(name: &str) -> String {
	let cleaned: String = name
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
				c
			} else {
				'_'
			}
		})
		.collect();
	if cleaned.chars().all(|c| c == '.') {
		"file".to_string()
	} else {
		cleaned
	}
}

/// Blob key for an upload: `{owner}/{unix_millis}_{sanitized name}`.
pub fn storage_path(owner_id: UserId, now: DateTime<Utc>, file_name: &str) -> String {
	format!(
		"{owner_id}/{}_{}",
		now.timestamp_millis(),
		sanitize_file_name(file_name)
	)
}

/// MIME type from a file extension.
pub fn content_type_for(file_name: &str) -> &'static str {
	let ext = file_name
		.rsplit_once('.')
		.map(|(_, ext)| ext.to_ascii_lowercase())
		.unwrap_or_default();
	match ext.as_str() {
		"pdf" => "application/pdf",
		"doc" => "application/msword",
		"docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
		"jpg" | "jpeg" => "image/jpeg",
		"png" => "image/png",
		"txt" => "text/plain",
		_ => "application/octet-stream",
	}
}
