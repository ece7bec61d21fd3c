// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqlitePool, Row};
use stage_server_auth::{AuditEventType, AuditId, UserId};

use crate::error::Result;
use crate::row::{parse, parse_opt, parse_timestamp, timestamp};

/// One row of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
	pub id: AuditId,
	pub event_type: AuditEventType,
	pub actor_id: Option<UserId>,
	pub target_id: Option<String>,
	pub details: serde_json::Value,
	pub created_at: DateTime<Utc>,
}

impl AuditEntry {
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			id: AuditId::generate(),
			event_type,
			actor_id: None,
			target_id: None,
			details: serde_json::Value::Object(Default::default()),
			created_at: Utc::now(),
		}
	}

	pub fn actor(mut self, actor_id: UserId) -> Self {
		self.actor_id = Some(actor_id);
		self
	}

	pub fn target(mut self, target_id: impl ToString) -> Self {
		self.target_id = Some(target_id.to_string());
		self
	}

	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}
}

#[async_trait]
pub trait AuditStore: Send + Sync {
	async fn record(&self, entry: &AuditEntry) -> Result<()>;
	async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>>;
}

#[async_trait]
impl AuditStore for AuditRepository {
	async fn record(&self, entry: &AuditEntry) -> Result<()> {
		self.record(entry).await
	}

	async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>> {
		self.list_recent(limit).await
	}
}

#[derive(Clone)]
pub struct AuditRepository {
	pool: SqlitePool,
}

impl AuditRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, entry), fields(event_type = %entry.event_type))]
	pub async fn record(&self, entry: &AuditEntry) -> Result<()> {
		let details = serde_json::to_string(&entry.details)?;

		sqlx::query(
			r#"
			INSERT INTO audit_log (id, event_type, actor_id, target_id, details, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(entry.id.to_string())
		.bind(entry.event_type.as_str())
		.bind(entry.actor_id.map(|a| a.to_string()))
		.bind(&entry.target_id)
		.bind(details)
		.bind(timestamp(entry.created_at))
		.execute(&self.pool)
		.await?;

		tracing::info!(
			audit_id = %entry.id,
			event_type = %entry.event_type,
			actor_id = ?entry.actor_id,
			target_id = ?entry.target_id,
			"audit event recorded"
		);
		Ok(())
	}

	/// Most recent entries first, at most `limit` (capped at 1000).
	#[tracing::instrument(skip(self))]
	pub async fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>> {
		let rows = sqlx::query(
			r#"
			SELECT id, event_type, actor_id, target_id, details, created_at
			FROM audit_log
			ORDER BY created_at DESC, id ASC
			LIMIT ?
			"#,
		)
		.bind(limit.clamp(0, 1000))
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_audit_row).collect()
	}
}

fn parse_audit_row(row: &sqlx::sqlite::SqliteRow) -> Result<AuditEntry> {
	let id: String = row.get("id");
	let event_type: String = row.get("event_type");
	let details: String = row.get("details");
	let created_at: String = row.get("created_at");

	Ok(AuditEntry {
		id: parse(&id, "audit id")?,
		event_type: parse(&event_type, "event_type")?,
		actor_id: parse_opt(row.get("actor_id"), "actor_id")?,
		target_id: row.get("target_id"),
		details: serde_json::from_str(&details)?,
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}
