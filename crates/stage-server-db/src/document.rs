// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document metadata repository. File bytes live in the blob store.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::{DocumentId, RequestId, UserId};
use stage_workflow_core::Document;

use crate::error::{DbError, Result};
use crate::row::{parse, parse_opt, parse_timestamp, timestamp};

pub(crate) const DOCUMENT_COLUMNS: &str = "d.id, d.name, d.kind, d.mime_type, d.size_bytes, \
	d.storage_path, d.owner_id, d.request_id, d.is_public, d.created_at";

#[async_trait]
pub trait DocumentStore: Send + Sync {
	async fn create_document(&self, document: &Document) -> Result<()>;
	async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>>;
	async fn list_all_documents(&self) -> Result<Vec<Document>>;
	async fn list_documents_visible_to(&self, user_id: &UserId) -> Result<Vec<Document>>;
	async fn list_documents_for_request(&self, request_id: &RequestId) -> Result<Vec<Document>>;
}

#[async_trait]
impl DocumentStore for DocumentRepository {
	async fn create_document(&self, document: &Document) -> Result<()> {
		self.create_document(document).await
	}

	async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
		self.get_document(id).await
	}

	async fn list_all_documents(&self) -> Result<Vec<Document>> {
		self.list_all_documents().await
	}

	async fn list_documents_visible_to(&self, user_id: &UserId) -> Result<Vec<Document>> {
		self.list_documents_visible_to(user_id).await
	}

	async fn list_documents_for_request(&self, request_id: &RequestId) -> Result<Vec<Document>> {
		self.list_documents_for_request(request_id).await
	}
}

#[derive(Clone)]
pub struct DocumentRepository {
	pool: SqlitePool,
}

impl DocumentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// `DbError::Conflict` if the storage path is already used.
	#[tracing::instrument(skip(self, document), fields(document_id = %document.id, owner_id = %document.owner_id))]
	pub async fn create_document(&self, document: &Document) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO documents (
				id, name, kind, mime_type, size_bytes, storage_path, owner_id,
				request_id, is_public, created_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(document.id.to_string())
		.bind(&document.name)
		.bind(&document.kind)
		.bind(&document.mime_type)
		.bind(document.size_bytes)
		.bind(&document.storage_path)
		.bind(document.owner_id.to_string())
		.bind(document.request_id.map(|r| r.to_string()))
		.bind(document.is_public)
		.bind(timestamp(document.created_at))
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::from_insert(e, "document at this storage path"))?;

		tracing::debug!(document_id = %document.id, size_bytes = document.size_bytes, "document created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(document_id = %id))]
	pub async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
		let row = sqlx::query(&format!("SELECT {DOCUMENT_COLUMNS} FROM documents d WHERE d.id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|row| parse_document_row(&row)).transpose()
	}

	/// Every document, newest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_all_documents(&self) -> Result<Vec<Document>> {
		let rows = sqlx::query(&format!(
			"SELECT {DOCUMENT_COLUMNS} FROM documents d ORDER BY d.created_at DESC, d.id ASC"
		))
		.fetch_all(&self.pool)
		.await?;

		let documents = rows.iter().map(parse_document_row).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = documents.len(), "listed documents");
		Ok(documents)
	}

	/// Documents owned by `user_id` plus public ones, newest first.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_documents_visible_to(&self, user_id: &UserId) -> Result<Vec<Document>> {
		let rows = sqlx::query(&format!(
			r#"
			SELECT {DOCUMENT_COLUMNS} FROM documents d
			WHERE d.owner_id = ? OR d.is_public = 1
			ORDER BY d.created_at DESC, d.id ASC
			"#
		))
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let documents = rows.iter().map(parse_document_row).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = documents.len(), "listed visible documents");
		Ok(documents)
	}

	/// Documents tagged directly with `request_id`.
	#[tracing::instrument(skip(self), fields(request_id = %request_id))]
	pub async fn list_documents_for_request(&self, request_id: &RequestId) -> Result<Vec<Document>> {
		let rows = sqlx::query(&format!(
			r#"
			SELECT {DOCUMENT_COLUMNS} FROM documents d
			WHERE d.request_id = ?
			ORDER BY d.created_at DESC, d.id ASC
			"#
		))
		.bind(request_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_document_row).collect()
	}
}

pub(crate) fn parse_document_row(row: &sqlx::sqlite::SqliteRow) -> Result<Document> {
	let id: String = row.get("id");
	let owner_id: String = row.get("owner_id");
	let created_at: String = row.get("created_at");

	Ok(Document {
		id: parse(&id, "document id")?,
		name: row.get("name"),
		kind: row.get("kind"),
		mime_type: row.get("mime_type"),
		size_bytes: row.get("size_bytes"),
		storage_path: row.get("storage_path"),
		owner_id: parse(&owner_id, "owner_id")?,
		request_id: parse_opt(row.get("request_id"), "request_id")?,
		is_public: row.get("is_public"),
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}
