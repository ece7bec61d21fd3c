// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Required-document checklist rows joining requests to documents.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::RequestId;
use stage_workflow_core::{Document, LinkAnnotation, RequestDocumentLink};

use crate::document::{parse_document_row, DOCUMENT_COLUMNS};
use crate::error::Result;
use crate::row::{parse, parse_opt, parse_timestamp, timestamp};

#[async_trait]
pub trait LinkStore: Send + Sync {
	async fn create_links(&self, links: &[RequestDocumentLink]) -> Result<()>;
	async fn list_links(&self, request_id: &RequestId) -> Result<Vec<RequestDocumentLink>>;
	async fn list_linked_documents(&self, request_id: &RequestId) -> Result<Vec<(Document, LinkAnnotation)>>;
}

#[async_trait]
impl LinkStore for LinkRepository {
	async fn create_links(&self, links: &[RequestDocumentLink]) -> Result<()> {
		self.create_links(links).await
	}

	async fn list_links(&self, request_id: &RequestId) -> Result<Vec<RequestDocumentLink>> {
		self.list_links(request_id).await
	}

	async fn list_linked_documents(&self, request_id: &RequestId) -> Result<Vec<(Document, LinkAnnotation)>> {
		self.list_linked_documents(request_id).await
	}
}

#[derive(Clone)]
pub struct LinkRepository {
	pool: SqlitePool,
}

impl LinkRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert all links or none.
	#[tracing::instrument(skip(self, links), fields(count = links.len()))]
	pub async fn create_links(&self, links: &[RequestDocumentLink]) -> Result<()> {
		let mut tx = self.pool.begin().await?;
		for link in links {
			sqlx::query(
				r#"
				INSERT INTO request_document_links (
					id, request_id, document_id, required_document_type, mandatory, created_at
				) VALUES (?, ?, ?, ?, ?, ?)
				"#,
			)
			.bind(link.id.to_string())
			.bind(link.request_id.to_string())
			.bind(link.document_id.map(|d| d.to_string()))
			.bind(&link.required_document_type)
			.bind(link.mandatory)
			.bind(timestamp(link.created_at))
			.execute(&mut *tx)
			.await?;
		}
		tx.commit().await?;

		tracing::debug!(count = links.len(), "request document links created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(request_id = %request_id))]
	pub async fn list_links(&self, request_id: &RequestId) -> Result<Vec<RequestDocumentLink>> {
		let rows = sqlx::query(
			r#"
			SELECT id, request_id, document_id, required_document_type, mandatory, created_at
			FROM request_document_links
			WHERE request_id = ?
			ORDER BY created_at ASC, id ASC
			"#,
		)
		.bind(request_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_link_row).collect()
	}

	/// Documents reached through links of `request_id`, each with its link
	/// annotation. A document linked twice appears twice.
	#[tracing::instrument(skip(self), fields(request_id = %request_id))]
	pub async fn list_linked_documents(&self, request_id: &RequestId) -> Result<Vec<(Document, LinkAnnotation)>> {
		let rows = sqlx::query(&format!(
			r#"
			SELECT {DOCUMENT_COLUMNS}, l.required_document_type, l.mandatory
			FROM request_document_links l
			JOIN documents d ON d.id = l.document_id
			WHERE l.request_id = ?
			"#
		))
		.bind(request_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let mut linked = Vec::with_capacity(rows.len());
		for row in &rows {
			let annotation = LinkAnnotation {
				required_document_type: row.get("required_document_type"),
				mandatory: row.get("mandatory"),
			};
			linked.push((parse_document_row(row)?, annotation));
		}
		tracing::debug!(count = linked.len(), "listed linked documents");
		Ok(linked)
	}
}

fn parse_link_row(row: &sqlx::sqlite::SqliteRow) -> Result<RequestDocumentLink> {
	let id: String = row.get("id");
	let request_id: String = row.get("request_id");
	let created_at: String = row.get("created_at");

	Ok(RequestDocumentLink {
		id: parse(&id, "link id")?,
		request_id: parse(&request_id, "request_id")?,
		document_id: parse_opt(row.get("document_id"), "document_id")?,
		required_document_type: row.get("required_document_type"),
		mandatory: row.get("mandatory"),
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}
